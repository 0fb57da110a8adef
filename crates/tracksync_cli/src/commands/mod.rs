pub(crate) mod issue;
pub(crate) mod meta;
pub(crate) mod repos;
pub(crate) mod shared;
pub(crate) mod step;
pub(crate) mod sync;
