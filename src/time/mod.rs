// Clock abstraction used by the controller and commands
pub mod source;
