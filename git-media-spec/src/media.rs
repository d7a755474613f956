/// Media type of object bodies, sent as `Content-Type` on upload and as
/// `Accept` on download.
pub const MEDIA_TYPE: &str = "application/vnd.git-media";

/// Media type of the JSON metadata the server answers an upload with.
pub const META_MEDIA_TYPE: &str = "application/vnd.git-media+json; charset=utf-8";

/// Name of the `Content-Type` parameter carrying the boundary token.
pub const HEADER_PARAM: &str = "header";
