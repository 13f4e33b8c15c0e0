//! Image library: metadata CRUD plus multipart upload and batch delete.

use crate::dto::{BatchDeleteRequest, ImageDto, ImageMetaRequest};
use crate::envelope::{emit, ResourceStream};
use crate::http::UploadFile;
use crate::model::{Ack, ImageMeta};
use crate::validate::{Validate, ValidationError};

use super::CrudRepository;

pub type ImageRepository = CrudRepository<ImageDto, ImageMeta, ImageMetaRequest>;

impl CrudRepository<ImageDto, ImageMeta, ImageMetaRequest> {
    /// Upload picked bytes. Oversized payloads surface as `Error { code:
    /// Some(413) }` like any other status.
    pub fn upload(&self, file: UploadFile, alt_text: Option<String>) -> ResourceStream<Ack> {
        let ctx = self.ctx.clone();
        emit("upload_image", async move {
            let request = ctx.client.build_upload_image(&file, alt_text.as_deref());
            let response = ctx.send(request).await?;
            ctx.client.parse_ack(response)
        })
    }

    /// Delete every selected image in one request. An empty selection is
    /// rejected without a request.
    pub fn batch_delete(&self, ids: Vec<i64>) -> Result<ResourceStream<Ack>, ValidationError> {
        let input = BatchDeleteRequest { ids };
        input.validate()?;
        let ctx = self.ctx.clone();
        Ok(emit("batch_delete_images", async move {
            let request = ctx.client.build_batch_delete_images(&input)?;
            let response = ctx.send(request).await?;
            ctx.client.parse_ack(response)
        }))
    }
}
