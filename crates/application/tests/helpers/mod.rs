pub mod builders;
pub mod mock_ports;

#[allow(unused_imports)]
pub use builders::*;
#[allow(unused_imports)]
pub use mock_ports::*;
