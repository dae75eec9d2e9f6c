//! S3 adapters

mod s3_store;

pub use s3_store::{BucketEndpoint, S3ObjectStore, DEFAULT_REGION};
