use core::fmt::Write as FmtWrite;

use embassy_net::{Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::Duration as EmbassyDuration;
use embedded_io_async::{Read, Write};
use embedded_tls::{
    Aes128GcmSha256, CryptoProvider, NoVerify, TlsConfig, TlsConnection, TlsContext, TlsError,
    TlsVerifier,
};
use esp_hal::rng::Rng;
use log::{info, warn};
use radarframe_core::{
    clock::{ServerDateTime, parse_http_date},
    cursor::ImageCursor,
    error::{ErrorKind, check_status, transfer_failure},
};

pub(super) const TLS_READ_BUF_BYTES: usize = 16_640;
pub(super) const TLS_WRITE_BUF_BYTES: usize = 4_096;
const TCP_BUF_BYTES: usize = 4_096;
const CHUNK_BYTES: usize = 1_024;
const HEADER_MAX_BYTES: usize = 2_048;
const SOCKET_TIMEOUT_SECS: u64 = 20;

/// TLS record buffers, too large for the task stack. Allocated once in
/// main and reborrowed for each of the (serialized) fetches.
pub(super) struct TlsBuffers {
    read: [u8; TLS_READ_BUF_BYTES],
    write: [u8; TLS_WRITE_BUF_BYTES],
}

impl TlsBuffers {
    pub(super) const fn new() -> Self {
        Self {
            read: [0; TLS_READ_BUF_BYTES],
            write: [0; TLS_WRITE_BUF_BYTES],
        }
    }
}

/// Hardware TRNG viewed through rand_core for the TLS handshake.
#[derive(Clone, Copy)]
struct HalRng(Rng);

impl rand_core::RngCore for HalRng {
    fn next_u32(&mut self) -> u32 {
        self.0.random()
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.0.random()) << 32) | u64::from(self.0.random())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.0.random().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl rand_core::CryptoRng for HalRng {}

/// The server is private and reached by hostname pinning on the LAN;
/// certificate verification is deliberately skipped.
struct TlsProvider {
    rng: HalRng,
    verifier: NoVerify,
}

impl CryptoProvider for TlsProvider {
    type CipherSuite = Aes128GcmSha256;
    type Signature = &'static [u8];

    fn rng(&mut self) -> impl rand_core::CryptoRngCore {
        &mut self.rng
    }

    fn verifier(
        &mut self,
    ) -> Result<&mut impl TlsVerifier<Self::CipherSuite>, embedded_tls::TlsError> {
        Ok(&mut self.verifier)
    }
}

fn process_head(head: &[u8]) -> Result<ServerDateTime, ErrorKind> {
    let text = core::str::from_utf8(head).map_err(|_| ErrorKind::InvalidResponse)?;
    let mut lines = text.split("\r\n");

    let status_line = lines.next().ok_or(ErrorKind::InvalidResponse)?;
    let code: u16 = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or(ErrorKind::InvalidResponse)?;
    check_status(code)?;

    // A missing or malformed date header is not fatal; the scheduler
    // falls back to a fixed retry delay.
    let mut server_time = ServerDateTime::NONE;
    for line in lines {
        if let Some((name, value)) = line.split_once(':')
            && name.eq_ignore_ascii_case("date")
        {
            match parse_http_date(value.trim()) {
                Ok(parsed) => server_time = parsed,
                Err(kind) => warn!("fetch: date header unparseable: {}", kind.as_str()),
            }
            break;
        }
    }

    Ok(server_time)
}

/// Streams one HTTPS GET into `sink`, one in-flight request at a time.
///
/// Body bytes are pushed in arrival order; the sink's capacity bound is
/// the only framing. Returns the server-reported wall clock taken from
/// the response date header.
pub(super) async fn fetch_into(
    stack: Stack<'_>,
    host: &str,
    port: u16,
    path: &str,
    rng: Rng,
    buffers: &mut TlsBuffers,
    sink: &mut ImageCursor<'_>,
) -> Result<ServerDateTime, ErrorKind> {
    if stack.config_v4().is_none() {
        return Err(ErrorKind::NoConnection);
    }

    let address = stack
        .dns_query(host, DnsQueryType::A)
        .await
        .map_err(|_| ErrorKind::NoConnection)?
        .first()
        .copied()
        .ok_or(ErrorKind::NoConnection)?;

    let mut rx_buffer = [0u8; TCP_BUF_BYTES];
    let mut tx_buffer = [0u8; TCP_BUF_BYTES];
    let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(EmbassyDuration::from_secs(SOCKET_TIMEOUT_SECS)));
    socket
        .connect((address, port))
        .await
        .map_err(|_| ErrorKind::NoConnection)?;

    let tls_config = TlsConfig::new().with_server_name(host);
    let mut tls = TlsConnection::<_, Aes128GcmSha256>::new(
        socket,
        &mut buffers.read,
        &mut buffers.write,
    );
    let provider = TlsProvider {
        rng: HalRng(rng),
        verifier: NoVerify,
    };
    tls.open(TlsContext::new(&tls_config, provider))
        .await
        .map_err(|_| ErrorKind::NoConnection)?;

    let mut request: heapless::String<256> = heapless::String::new();
    write!(
        request,
        "GET {path} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n"
    )
    .map_err(|_| ErrorKind::InvalidResponse)?;
    tls.write_all(request.as_bytes())
        .await
        .map_err(|_| ErrorKind::NoConnection)?;
    tls.flush().await.map_err(|_| ErrorKind::NoConnection)?;

    let mut chunk = [0u8; CHUNK_BYTES];
    let mut head: heapless::Vec<u8, HEADER_MAX_BYTES> = heapless::Vec::new();
    let mut server_time = ServerDateTime::NONE;
    let mut in_body = false;

    loop {
        let read = match tls.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            // Only a close_notify after the body counts as end of
            // stream. Anything else mid-body is a truncated transfer;
            // the socket inactivity timeout shows up here as an I/O
            // error because the stack aborts the connection.
            Err(TlsError::ConnectionClosed) if in_body => break,
            Err(err) => {
                warn!(
                    "fetch: {} transport lost after {} body bytes: {:?}",
                    path,
                    sink.written(),
                    err
                );
                return Err(transfer_failure(in_body, matches!(err, TlsError::Io(_))));
            }
        };

        let mut data = &chunk[..read];
        if !in_body {
            let mut consumed = data.len();
            for (i, byte) in data.iter().enumerate() {
                if head.push(*byte).is_err() {
                    return Err(ErrorKind::InvalidResponse);
                }
                if head.ends_with(b"\r\n\r\n") {
                    consumed = i + 1;
                    in_body = true;
                    break;
                }
            }
            if !in_body {
                continue;
            }
            server_time = process_head(&head)?;
            data = &data[consumed..];
        }

        if !data.is_empty() {
            sink.push(data)?;
        }
    }

    if !in_body {
        return Err(ErrorKind::InvalidResponse);
    }

    let _ = tls.close().await;
    info!("fetch: {} done, {} bytes", path, sink.written());
    Ok(server_time)
}
