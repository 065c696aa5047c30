//! `ziggurat_core` is a small text template engine. It parses a directive
//! syntax into a typed syntax tree and renders that tree against a context.
//!
//! ## Syntax
//!
//! ```text
//! Hello {name|capitalize}!
//!
//! @if admin@
//! You can manage {site.name}.
//! @else@
//! Welcome back.
//! @endif@
//!
//! @for item in items@
//! - {item.title}
//! @endfor@
//!
//! @include footer.txt@
//!
//! @macro link(href, label)@<a href="{href}">{label}</a>@endmacro@
//! {!link href="/docs" label=title}
//! ```
//!
//! A backslash escapes `@`, `{` and `}` in literal text: `\@`, `\{`, `\}`.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template source
//!   → Parser (character cursor, one function per grammar production)
//!   → Block (syntax tree)
//!   → Renderer (context + transforms + base directory)
//!   → Output text
//! ```
//!
//! `@include@` loads, parses and renders another file relative to the
//! including template's directory, caching the rendered text for the rest
//! of the render. Macro calls render the macro body against a fresh context
//! that only holds the macro's parameters.
//!
//! ## Modules
//!
//! - [`config`]: `ziggurat.toml` loading: data files and transform aliases.
//! - [`printer`]: Indented dump of a syntax tree for debugging.
//!
//! ## Quick Start
//!
//! ```rust
//! use ziggurat_core::Context;
//! use ziggurat_core::Template;
//!
//! let template = Template::from_source("Hello {name|upper}!").unwrap();
//! let mut context = Context::new().with("name", "World");
//!
//! assert_eq!(template.render(&mut context).unwrap(), "Hello WORLD!");
//! ```

pub use ast::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use loader::*;
pub use parser::*;
pub use printer::print_node;
pub use printer::print_tree;
pub use renderer::*;
pub use template::*;
pub use transforms::*;
pub use value::*;

mod ast;
pub mod config;
mod context;
#[allow(unused_assignments)]
mod error;
mod loader;
mod parser;
pub mod printer;
mod renderer;
mod template;
mod transforms;
mod value;
