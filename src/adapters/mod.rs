// Concrete content stores behind the `ContentStore` port.

pub mod memory;
pub mod sanity;

pub use memory::MemoryStore;
pub use sanity::SanityStore;
