//! Server-sent-events stream for one reload client.
//!
//! The HTTP response is written by hand on the raw connection so it can stay
//! open: headers once, then one frame per broadcast until the client goes
//! away or the hub closes the queue.

use std::io::{self, Write};
use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError};
use tiny_http::Request;

use super::hub::ReloadHub;
use super::message::{KEEP_ALIVE_FRAME, RETRY_FRAME, ReloadMessage};
use crate::utils::mime::types::EVENT_STREAM;

/// Interval of keep-alive comments on an idle stream.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Hold `request` open as an event stream until disconnect or shutdown.
pub fn serve_event_stream(request: Request, hub: &ReloadHub) {
    let (handle, rx) = hub.register();
    let mut writer = request.into_writer();

    let result = write_head(&mut writer).and_then(|()| pump(&mut writer, &rx, KEEP_ALIVE_INTERVAL));
    if let Err(e) = result {
        crate::debug!("reload"; "stream closed: {}", e);
    }

    hub.unregister(handle);
}

fn write_head(writer: &mut impl Write) -> io::Result<()> {
    write!(
        writer,
        "HTTP/1.1 200 OK\r\n\
         Content-Type: {EVENT_STREAM}\r\n\
         Cache-Control: no-cache\r\n\
         Connection: keep-alive\r\n\
         Access-Control-Allow-Origin: *\r\n\
         \r\n"
    )?;
    writer.write_all(RETRY_FRAME)?;
    writer.flush()
}

/// Forward messages from `rx` to `writer` until the queue closes.
///
/// Write errors (client gone) end the stream with `Err`.
fn pump(writer: &mut impl Write, rx: &Receiver<ReloadMessage>, keep_alive: Duration) -> io::Result<()> {
    loop {
        match rx.recv_timeout(keep_alive) {
            Ok(msg) => writer.write_all(msg.sse_frame())?,
            Err(RecvTimeoutError::Timeout) => writer.write_all(KEEP_ALIVE_FRAME)?,
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }
        writer.flush()?;
    }
}
