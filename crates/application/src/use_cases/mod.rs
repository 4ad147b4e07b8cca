pub mod resolve_host;

pub use resolve_host::{LookupRequest, Resolution, ResolutionPolicy, ResolveHostUseCase, MAX_HOPS};
