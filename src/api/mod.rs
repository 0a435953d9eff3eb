mod buckets;
mod common;
mod objects;

pub use buckets::{BucketsService, CreateBucketRequest, DeleteBucketRequest, ListBucketsRequest};
pub use objects::{
    CopyObjectRequest, DeleteObjectRequest, GetObjectRequest, HeadObjectRequest, ListKeysRequest,
    ListObjectsRequest, ObjectsService, PutObjectRequest,
};
