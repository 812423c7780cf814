//! CLI command implementations.

pub(crate) mod apply;
pub(crate) mod extract;
pub(crate) mod stream;
pub(crate) mod strip;

pub(crate) use apply::ApplyArgs;
pub(crate) use extract::ExtractArgs;
pub(crate) use stream::StreamArgs;
pub(crate) use strip::StripArgs;
