//! Body encoding and response decoding.

pub mod request;
pub mod response;

pub use request::{EncodedBody, FormPart, MultipartPayload, encode_body, to_reqwest_form};
pub use response::{buffer_body, decode_body, decode_response};
