// crates/devinfo-mcp/src/tools/environment_tools.rs
// ============================================================================
// Module: Environment Tools Tool
// Description: Development tooling catalogue per language environment.
// Purpose: Implement the `get-environment-tools` tool.
// Dependencies: devinfo-mcp registry and handler contracts
// ============================================================================

//! ## Overview
//! Lists tools grouped by category for `java`, `node`, or `typescript`. An
//! optional query keeps only categories whose name, tool names, or tool
//! descriptions contain it (case-insensitive).

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
pub const NAME: &str = "get-environment-tools";

// ============================================================================
// SECTION: Catalogue
// ============================================================================

/// Tool category within an environment.
struct Category {
    /// Category key (title-cased on display).
    name: &'static str,
    /// Tool name and description pairs.
    tools: &'static [(&'static str, &'static str)],
}

impl Category {
    /// Returns true when the category or any of its tools mention `query`.
    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.tools.iter().any(|(tool, description)| {
                tool.to_lowercase().contains(query) || description.to_lowercase().contains(query)
            })
    }
}

/// Supported environments in display order.
const ENVIRONMENTS: &[(&str, &[Category])] = &[
    (
        "java",
        &[
            Category {
                name: "build_tools",
                tools: &[
                    ("maven", "XML-based project management and build tool"),
                    ("gradle", "Groovy/Kotlin DSL build automation tool"),
                    ("sbt", "Scala Build Tool, also used for Java projects"),
                ],
            },
            Category {
                name: "testing",
                tools: &[
                    ("junit5", "Modern Java testing framework"),
                    ("mockito", "Mocking framework for unit tests"),
                    ("testcontainers", "Integration testing with Docker containers"),
                    ("spring-boot-test", "Testing support for Spring Boot applications"),
                ],
            },
            Category {
                name: "frameworks",
                tools: &[
                    ("spring-boot", "Production-ready Java application framework"),
                    ("quarkus", "Kubernetes-native Java framework"),
                    ("micronaut", "Modern microservices framework"),
                ],
            },
            Category {
                name: "ide",
                tools: &[
                    ("intellij", "JetBrains IntelliJ IDEA"),
                    ("eclipse", "Eclipse IDE for Java Developers"),
                    ("vscode", "Visual Studio Code with Java extensions"),
                ],
            },
        ],
    ),
    (
        "node",
        &[
            Category {
                name: "package_managers",
                tools: &[
                    ("npm", "Default Node.js package manager"),
                    ("yarn", "Fast, reliable package manager"),
                    ("pnpm", "Efficient package manager with hard links"),
                ],
            },
            Category {
                name: "testing",
                tools: &[
                    ("jest", "JavaScript testing framework"),
                    ("mocha", "Feature-rich test framework"),
                    ("vitest", "Fast Vite-native test framework"),
                ],
            },
            Category {
                name: "frameworks",
                tools: &[
                    ("express", "Minimal web application framework"),
                    ("fastify", "High-performance web framework"),
                    ("nest", "Progressive Node.js framework"),
                ],
            },
            Category {
                name: "tools",
                tools: &[
                    ("nodemon", "Development server with auto-restart"),
                    ("eslint", "JavaScript/TypeScript linter"),
                    ("prettier", "Code formatter"),
                ],
            },
        ],
    ),
    (
        "typescript",
        &[
            Category {
                name: "compilers",
                tools: &[
                    ("tsc", "Official TypeScript compiler"),
                    ("esbuild", "Fast TypeScript/JavaScript bundler"),
                    ("swc", "Super-fast TypeScript/JavaScript compiler"),
                ],
            },
            Category {
                name: "frameworks",
                tools: &[
                    ("react", "UI library with TypeScript support"),
                    ("vue", "Progressive framework with TypeScript"),
                    ("angular", "Full-featured TypeScript framework"),
                ],
            },
            Category {
                name: "tools",
                tools: &[
                    ("ts-node", "Execute TypeScript directly"),
                    ("typescript-eslint", "TypeScript-specific ESLint rules"),
                    ("type-fest", "Collection of essential TypeScript types"),
                ],
            },
            Category {
                name: "bundlers",
                tools: &[
                    ("webpack", "Module bundler with TypeScript support"),
                    ("vite", "Fast build tool with native TypeScript"),
                    ("rollup", "Module bundler for libraries"),
                ],
            },
        ],
    ),
];

// ============================================================================
// SECTION: Tool
// ============================================================================

/// Returns the tool descriptor.
#[must_use]
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Get development tools and best practices for Java, Node.js, or TypeScript environments",
        vec![
            FieldSpec::required("environment", FieldKind::String)
                .with_description("Environment type: java, node, typescript"),
            FieldSpec::optional("query", FieldKind::String)
                .with_default("")
                .with_description("Specific query about tools or libraries"),
        ],
    )
}

/// Handler entry point.
///
/// # Errors
///
/// Returns [`ToolFailure`] when `environment` is unavailable.
pub fn handle(arguments: &ValidatedArguments) -> Result<String, ToolFailure> {
    let environment = arguments.require_str("environment")?;
    let query = arguments.str("query").unwrap_or_default();
    Ok(environment_tools(environment, query))
}

/// Renders the tooling catalogue for an environment, optionally filtered.
#[must_use]
pub fn environment_tools(environment: &str, query: &str) -> String {
    let key = environment.to_lowercase();
    let Some((_, categories)) = ENVIRONMENTS.iter().find(|(name, _)| *name == key) else {
        let available: Vec<&str> = ENVIRONMENTS.iter().map(|(name, _)| *name).collect();
        return format!(
            "Environment '{environment}' not supported. Available: {}",
            available.join(", ")
        );
    };
    let needle = query.to_lowercase();
    let (header, selected): (String, Vec<&Category>) = if needle.is_empty() {
        (format!("**{} Development Tools:**\n", key.to_uppercase()), categories.iter().collect())
    } else {
        let selected: Vec<&Category> =
            categories.iter().filter(|category| category.matches(&needle)).collect();
        if selected.is_empty() {
            return format!("No {key} tools found matching '{query}'");
        }
        (format!("**{} Tools matching '{query}':**\n", key.to_uppercase()), selected)
    };
    let mut lines = vec![header];
    for category in selected {
        lines.push(format!("**{}:**", title_case(category.name)));
        for (tool, description) in category.tools {
            lines.push(format!("- **{tool}**: {description}"));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
