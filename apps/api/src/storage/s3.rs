use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::storage::{FileStore, StorageError, StoredFile};

const KEY_PREFIX: &str = "uploads/";
const META_ORIGINAL_NAME: &str = "original-name";
const META_FILE_SIZE: &str = "file-size";

/// S3 / MinIO backed store. Objects live under `uploads/<name>`; the
/// original file name and size ride along as object metadata.
pub struct S3FileStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3FileStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

fn object_key(name: &str) -> String {
    format!("{KEY_PREFIX}{name}")
}

fn backend<E: std::fmt::Display>(action: &str) -> impl FnOnce(E) -> StorageError + '_ {
    move |e| StorageError::Backend(format!("S3 {action} failed: {e}"))
}

#[async_trait]
impl FileStore for S3FileStore {
    async fn store_file(&self, name: &str, file: StoredFile) -> Result<(), StorageError> {
        let key = object_key(name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.bytes))
            .content_type(&file.mime_type)
            .metadata(META_ORIGINAL_NAME, &file.original_name)
            .metadata(META_FILE_SIZE, file.file_size.to_string())
            .send()
            .await
            .map_err(backend("upload"))?;

        info!("Uploaded file to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn get_file(&self, name: &str) -> Result<Option<StoredFile>, StorageError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(object_key(name))
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Ok(None)
            }
            Err(e) => return Err(backend("download")(e)),
        };

        let metadata = output.metadata().cloned().unwrap_or_default();
        let mime_type = output
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = output
            .body
            .collect()
            .await
            .map_err(backend("read body"))?
            .into_bytes();

        Ok(Some(StoredFile {
            original_name: metadata
                .get(META_ORIGINAL_NAME)
                .cloned()
                .unwrap_or_else(|| name.to_string()),
            file_size: metadata
                .get(META_FILE_SIZE)
                .and_then(|s| s.parse().ok())
                .unwrap_or(bytes.len() as u64),
            mime_type,
            bytes,
        }))
    }

    async fn delete_file(&self, name: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(object_key(name))
            .send()
            .await
            .map_err(backend("delete"))?;
        Ok(())
    }

    async fn file_exists(&self, name: &str) -> Result<bool, StorageError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(object_key(name))
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(backend("head")(e)),
        }
    }

    // TODO: follow continuation tokens once a bucket can exceed 1000 uploads.
    async fn list_files(&self) -> Result<Vec<String>, StorageError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(KEY_PREFIX)
            .send()
            .await
            .map_err(backend("list"))?;

        let mut names: Vec<String> = output
            .contents()
            .iter()
            .filter_map(|object| object.key())
            .filter_map(|key| key.strip_prefix(KEY_PREFIX))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }
}
