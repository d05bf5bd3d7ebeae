//! Inert, serializable building blocks of a CloudFormation template.
//!
//! Entities are plain descriptors: they are constructed, added to a [`Template`]
//! and serialized. Cross references are checked when an entity is added, so a
//! template that exists is always free of dangling references.
pub mod ec2;
pub mod error;
pub mod iam;
pub mod intrinsic;
pub mod output;
pub mod parameter;
pub mod resource;
pub mod template;

pub use error::{ConstructionError, Error, Result};
pub use intrinsic::{Expr, LogicalId};
pub use output::Output;
pub use parameter::Parameter;
pub use resource::Resource;
pub use template::Template;
