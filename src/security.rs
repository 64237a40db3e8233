//! MS-DTYP security structures: security descriptors, ACLs, ACEs and SIDs.

mod ace;
mod acl;
pub mod change_password;
mod rights;
mod security_descriptor;
mod sid;

pub use ace::*;
pub use acl::*;
pub use rights::*;
pub use security_descriptor::*;
pub use sid::*;
