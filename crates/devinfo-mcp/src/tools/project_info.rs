// crates/devinfo-mcp/src/tools/project_info.rs
// ============================================================================
// Module: Project Info Tool
// Description: Canned project metadata lookup by name and environment.
// Purpose: Implement the `get-project-info` tool.
// Dependencies: devinfo-mcp registry and handler contracts
// ============================================================================

//! ## Overview
//! Looks up a project case-insensitively and renders either its detail
//! listing for an environment, its general summary, or its description.
//! Unknown projects yield an informative message rather than an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::handler::ToolFailure;
use crate::registry::FieldKind;
use crate::registry::FieldSpec;
use crate::registry::ToolDescriptor;
use crate::tools::title_case;
use crate::validation::ValidatedArguments;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tool name.
pub const NAME: &str = "get-project-info";

/// Environment value selecting the general summary.
const GENERAL: &str = "general";

// ============================================================================
// SECTION: Catalogue
// ============================================================================

/// One detail value in an environment listing.
enum Detail {
    /// Single value.
    Text(&'static str),
    /// Comma-joined list.
    List(&'static [&'static str]),
}

/// Catalogue entry.
struct Project {
    /// Lower-case lookup key.
    key: &'static str,
    /// One-line description.
    description: &'static str,
    /// General summary.
    general: &'static str,
    /// Per-environment details, in display order.
    environments: &'static [(&'static str, &'static [(&'static str, Detail)])],
}

/// Known projects in display order.
const PROJECTS: &[Project] = &[
    Project {
        key: "java-core",
        description: "Enterprise Java application with Spring Boot backend",
        general: "Core Java business logic service with Spring Boot framework",
        environments: &[(
            "java",
            &[
                ("framework", Detail::Text("Spring Boot 3.2")),
                ("build_tool", Detail::Text("Maven")),
                ("java_version", Detail::Text("17")),
                (
                    "dependencies",
                    Detail::List(&[
                        "spring-boot-starter-web",
                        "spring-boot-starter-data-jpa",
                        "junit5",
                    ]),
                ),
                ("architecture", Detail::Text("Microservices with REST APIs")),
            ],
        )],
    },
    Project {
        key: "node-api",
        description: "RESTful API service built with Node.js and TypeScript",
        general: "Node.js TypeScript API service with Express framework",
        environments: &[
            (
                "node",
                &[
                    ("runtime", Detail::Text("Node.js 18+")),
                    ("framework", Detail::Text("Express.js")),
                    ("package_manager", Detail::Text("npm")),
                    (
                        "dependencies",
                        Detail::List(&["express", "@types/express", "typescript", "jest"]),
                    ),
                    ("architecture", Detail::Text("RESTful microservice")),
                ],
            ),
            (
                "typescript",
                &[
                    ("version", Detail::Text("5.0+")),
                    ("config", Detail::Text("Strict mode enabled")),
                    ("tools", Detail::List(&["ESLint", "Prettier", "Jest"])),
                    ("types", Detail::Text("Full type coverage with @types packages")),
                ],
            ),
        ],
    },
    Project {
        key: "frontend-app",
        description: "React-based frontend application with TypeScript",
        general: "Modern React frontend with TypeScript and Vite",
        environments: &[
            (
                "typescript",
                &[
                    ("framework", Detail::Text("React 18")),
                    ("bundler", Detail::Text("Vite")),
                    ("state", Detail::Text("Redux Toolkit")),
                    ("testing", Detail::Text("Vitest + React Testing Library")),
                    ("styling", Detail::Text("Tailwind CSS")),
                ],
            ),
            (
                "node",
                &[
                    ("runtime", Detail::Text("Node.js 18+")),
                    ("package_manager", Detail::Text("yarn")),
                    ("scripts", Detail::Text("Build, test, lint automation")),
                ],
            ),
        ],
    },
];

// ============================================================================
// SECTION: Tool
// ============================================================================

/// Returns the tool descriptor.
#[must_use]
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Retrieve project information for Java, Node.js, or TypeScript environments",
        vec![
            FieldSpec::required("project_name", FieldKind::String)
                .with_description("The name of the project to retrieve information for"),
            FieldSpec::optional("environment", FieldKind::String)
                .with_default(GENERAL)
                .with_description("Environment type: java, node, typescript, or general"),
        ],
    )
}

/// Handler entry point.
///
/// # Errors
///
/// Returns [`ToolFailure`] when `project_name` is unavailable.
pub fn handle(arguments: &ValidatedArguments) -> Result<String, ToolFailure> {
    let project_name = arguments.require_str("project_name")?;
    let environment = arguments.str("environment").unwrap_or(GENERAL);
    Ok(project_info(project_name, environment))
}

/// Renders project information for an environment.
#[must_use]
pub fn project_info(project_name: &str, environment: &str) -> String {
    let key = project_name.to_lowercase();
    let environment = environment.to_lowercase();
    let Some(project) = PROJECTS.iter().find(|project| project.key == key) else {
        let available: Vec<&str> = PROJECTS.iter().map(|project| project.key).collect();
        return format!(
            "Project '{project_name}' not found. Available projects: {}",
            available.join(", ")
        );
    };
    match environment.as_str() {
        GENERAL => return format!("**{project_name}:** {}", project.general),
        "description" => return format!("**{project_name}:** {}", project.description),
        _ => {}
    }
    let Some((_, details)) = project.environments.iter().find(|(name, _)| *name == environment)
    else {
        return format!("**{project_name}:** {}", project.description);
    };
    let mut lines =
        vec![format!("**{project_name} - {} Environment:**", environment.to_uppercase())];
    for (key, detail) in *details {
        let value = match detail {
            Detail::Text(text) => (*text).to_string(),
            Detail::List(items) => items.join(", "),
        };
        lines.push(format!("- {}: {value}", title_case(key)));
    }
    lines.join("\n")
}
