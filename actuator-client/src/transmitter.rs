use actuator_shared::{to_hex, Frame, ProtocolVersion};
use log::{debug, warn};

pub const CONTENT_TYPE: &str = "application/octet-stream";

/// Posts frames without waiting for the answer. Failures are logged and dropped.
pub struct Transmitter {
    url: String,
    protocol: ProtocolVersion,
}

impl Transmitter {
    pub fn new(url: impl Into<String>, protocol: ProtocolVersion) -> Self {
        Self {
            url: url.into(),
            protocol,
        }
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    pub fn send(&self, frame: &Frame) {
        let body = frame.encode(self.protocol);
        debug!("{} frame {}", self.protocol, to_hex(&body));

        ehttp::fetch(self.request(body), |result| match result {
            Ok(response) if response.ok => {
                debug!("Response: {}", response.text().unwrap_or_default());
            }
            Ok(response) => {
                warn!(
                    "Actuator answered {} {}",
                    response.status, response.status_text
                );
            }
            Err(e) => warn!("Failed to send frame: {e}"),
        });
    }

    fn request(&self, body: Vec<u8>) -> ehttp::Request {
        let mut request = ehttp::Request::post(&self.url, body);
        request
            .headers
            .insert("Content-Type".to_string(), CONTENT_TYPE.to_string());
        request
    }
}
