use std::time::Duration;

/// The outcome of a web call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebResponse<T> {
    pub status: u16,
    /// Time from sending the request to receiving the response head.
    pub duration: Duration,
    /// Response headers in the order received.
    pub headers: Vec<(String, String)>,
    pub data: T,
}

impl<T> WebResponse<T> {
    /// Whether the status is in the 2xx range.
    pub fn is_good_response(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header called `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WebResponse<U> {
        WebResponse {
            status: self.status,
            duration: self.duration,
            headers: self.headers,
            data: f(self.data),
        }
    }
}
