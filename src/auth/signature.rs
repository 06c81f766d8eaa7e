use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the handshake signature for a stream.
///
/// HMAC-SHA256 keyed with `client_secret` over `"{client_id},{meeting_uuid},{stream_id}"`,
/// rendered as 64 lowercase hex characters.
pub fn sign(client_id: &str, meeting_uuid: &str, stream_id: &str, client_secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(client_secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(client_id.as_bytes());
    mac.update(b",");
    mac.update(meeting_uuid.as_bytes());
    mac.update(b",");
    mac.update(stream_id.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}
