//! Request bodies sent to the pipeline API.

use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PresignRequest<'a> {
    pub content_type: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterImageRequest<'a> {
    pub image_url: &'a str,
    pub is_common_use: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateCaptionsRequest<'a> {
    pub image_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_field_names() {
        let presign = serde_json::to_value(PresignRequest {
            content_type: "image/png",
        })
        .unwrap();
        assert_eq!(presign, json!({"contentType": "image/png"}));

        let register = serde_json::to_value(RegisterImageRequest {
            image_url: "https://cdn/x.png",
            is_common_use: false,
        })
        .unwrap();
        assert_eq!(
            register,
            json!({"imageUrl": "https://cdn/x.png", "isCommonUse": false})
        );

        let captions = serde_json::to_value(GenerateCaptionsRequest { image_id: "img-1" }).unwrap();
        assert_eq!(captions, json!({"imageId": "img-1"}));
    }
}
