//! Incremental Server-Sent Events decoder.
//!
//! Network reads do not line up with event boundaries: one read may carry
//! half a frame, several frames, or stop in the middle of a UTF-8 sequence.
//! [`SseDecoder`] buffers bytes until a full line is available and
//! dispatches a frame on every blank line.

use tracing::trace;

/// One dispatched event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub id: Option<String>,
    /// `data:` lines joined with `\n`.
    pub data: String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    pending: Option<SseFrame>,
    has_data: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one network read and returns every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(frame) = self.process_line(&String::from_utf8_lossy(&line)) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flushes a trailing frame that was not followed by a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest);
            let line = line.strip_suffix('\r').unwrap_or(&line).to_string();
            if let Some(frame) = self.process_line(&line) {
                return Some(frame);
            }
        }
        self.dispatch()
    }

    /// Takes the pending frame. A frame that never saw a `data` field is
    /// dropped.
    fn dispatch(&mut self) -> Option<SseFrame> {
        let frame = self.pending.take();
        std::mem::take(&mut self.has_data).then_some(frame).flatten()
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            trace!(comment = %line, "Skipping SSE comment");
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        let frame = self.pending.get_or_insert_with(SseFrame::default);
        match field {
            "data" => {
                if self.has_data {
                    frame.data.push('\n');
                }
                frame.data.push_str(value);
                self.has_data = true;
            }
            "event" => frame.event = Some(value.to_string()),
            "id" => frame.id = Some(value.to_string()),
            _ => trace!(field, "Ignoring unknown SSE field"),
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(frames: &[SseFrame]) -> Vec<&str> {
        frames.iter().map(|f| f.data.as_str()).collect()
    }

    #[test]
    fn decodes_several_frames_in_one_read() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"data: one\n\ndata: two\n\ndata: [DONE]\n\n");
        assert_eq!(data(&frames), ["one", "two", "[DONE]"]);
    }

    #[test]
    fn frame_split_across_two_reads() {
        let mut decoder = SseDecoder::new();
        assert!(decoder
            .push(b"data: {\"choices\":[{\"delta\":{\"con")
            .is_empty());
        let frames = decoder.push(b"tent\":\"Lab A.\"}}]}\n\ndata: [DO");
        assert_eq!(data(&frames), [r#"{"choices":[{"delta":{"content":"Lab A."}}]}"#]);
        let frames = decoder.push(b"NE]\n\n");
        assert_eq!(data(&frames), ["[DONE]"]);
    }

    #[test]
    fn blank_line_split_between_reads() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: x\n").is_empty());
        assert_eq!(data(&decoder.push(b"\n")), ["x"]);
    }

    #[test]
    fn crlf_comments_and_multiline_data() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b": ping\r\n\r\nevent: delta\r\nid: 7\r\ndata: a\r\ndata:b\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("delta"));
        assert_eq!(frames[0].id.as_deref(), Some("7"));
        assert_eq!(frames[0].data, "a\nb");
    }

    #[test]
    fn multibyte_character_split_across_reads() {
        let mut decoder = SseDecoder::new();
        let bytes = "data: café\n\n".as_bytes();
        // Split inside the two-byte 'é'.
        let cut = bytes.len() - 3;
        assert!(decoder.push(&bytes[..cut]).is_empty());
        assert_eq!(data(&decoder.push(&bytes[cut..])), ["café"]);
    }

    #[test]
    fn frames_without_data_are_not_dispatched() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"event: ping\n\nid: 3\n\ndata: one\n\n");
        assert_eq!(data(&frames), ["one"]);
        assert_eq!(frames[0].event, None);

        assert!(decoder.push(b"event: ping\n").is_empty());
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn empty_data_field_still_dispatches() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"data:\n\ndata:\ndata: x\n\n");
        assert_eq!(data(&frames), ["", "\nx"]);
    }

    #[test]
    fn finish_flushes_unterminated_frame() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish().map(|f| f.data), Some("tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }
}
