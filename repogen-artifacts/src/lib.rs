//! Repogen Artifacts - generated files for a working copy
//!
//! README, requirements.txt, Python API docs, .gitignore and the markdown
//! analytics, plus the pipeline that produces all of them for one repository.

pub mod analytics;
pub mod docs;
pub mod gitignore;
pub mod pipeline;
pub mod readme;
pub mod requirements;
pub mod tool;
pub mod types;

pub use analytics::*;
pub use docs::DocsGenerator;
pub use gitignore::GitignoreGenerator;
pub use pipeline::*;
pub use readme::ReadmeGenerator;
pub use requirements::RequirementsGenerator;
pub use tool::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use types::*;
