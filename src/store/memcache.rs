//! Minimal memcached text-protocol client: `set` only, bounded idle pool, fixed timeouts.

use anyhow::{Context, Result, anyhow, bail};
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::time::Duration;

use crate::store::ShardClient;
use crate::utils::config::StoreConsts;

/// One open connection; reads go through the buffer, writes through `get_mut`.
struct Conn {
    stream: BufReader<TcpStream>,
}

pub struct MemcacheClient {
    addr: String,
    timeout: Duration,
    max_idle: usize,
    idle: Mutex<Vec<Conn>>,
}

impl MemcacheClient {
    /// Client for `addr` (`host:port`). Does not connect until the first write.
    pub fn new(addr: &str) -> Result<Self> {
        Self::with_limits(addr, StoreConsts::TIMEOUT, StoreConsts::MAX_IDLE_CONNS)
    }

    pub fn with_limits(addr: &str, timeout: Duration, max_idle: usize) -> Result<Self> {
        match addr.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
            _ => bail!("invalid memcached address {:?}, expected host:port", addr),
        }
        Ok(Self {
            addr: addr.to_string(),
            timeout,
            max_idle,
            idle: Mutex::new(Vec::new()),
        })
    }

    /// Number of pooled idle connections.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|v| v.len()).unwrap_or(0)
    }

    fn connect(&self) -> Result<Conn> {
        let addrs: Vec<SocketAddr> = self
            .addr
            .to_socket_addrs()
            .with_context(|| format!("resolve {}", self.addr))?
            .collect();
        let mut last_err = None;
        for sa in addrs {
            match TcpStream::connect_timeout(&sa, self.timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_write_timeout(Some(self.timeout))?;
                    stream.set_nodelay(true)?;
                    return Ok(Conn {
                        stream: BufReader::new(stream),
                    });
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => anyhow!(e).context(format!("connect {}", self.addr)),
            None => anyhow!("{} resolved to no addresses", self.addr),
        })
    }

    fn checkout(&self) -> Result<Conn> {
        let pooled = self.idle.lock().ok().and_then(|mut v| v.pop());
        match pooled {
            Some(c) => Ok(c),
            None => self.connect(),
        }
    }

    /// Return a healthy connection; dropped when the pool is full.
    fn checkin(&self, conn: Conn) {
        if let Ok(mut v) = self.idle.lock()
            && v.len() < self.max_idle
        {
            v.push(conn);
        }
    }

    fn send_set(conn: &mut Conn, key: &str, value: &[u8]) -> Result<()> {
        let mut req = Vec::with_capacity(key.len() + value.len() + 32);
        write!(req, "set {} 0 0 {}\r\n", key, value.len())?;
        req.extend_from_slice(value);
        req.extend_from_slice(b"\r\n");
        conn.stream.get_mut().write_all(&req)?;

        let mut line = String::new();
        if conn.stream.read_line(&mut line)? == 0 {
            bail!("connection closed by server");
        }
        match line.trim_end() {
            "STORED" => Ok(()),
            other => bail!("unexpected reply {:?}", other),
        }
    }
}

/// Keys must be 1..=250 bytes with no whitespace or control characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > StoreConsts::MAX_KEY_LEN {
        bail!("key length {} out of range", key.len());
    }
    if key.bytes().any(|b| b <= b' ' || b == 0x7f) {
        bail!("key {:?} contains whitespace or control characters", key);
    }
    Ok(())
}

impl ShardClient for MemcacheClient {
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        validate_key(key)?;
        let mut conn = self.checkout()?;
        // A connection that failed mid-request is in an unknown state: drop it.
        Self::send_set(&mut conn, key, value).with_context(|| format!("set {} on {}", key, self.addr))?;
        self.checkin(conn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_validation() {
        assert!(validate_key("idfa:abc").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("idfa:a b").is_err());
        assert!(validate_key("idfa:a\nb").is_err());
        assert!(validate_key(&"k".repeat(251)).is_err());
        assert!(validate_key(&"k".repeat(250)).is_ok());
    }

    #[test]
    fn address_validation() {
        assert!(MemcacheClient::new("127.0.0.1:33013").is_ok());
        assert!(MemcacheClient::new("localhost:11211").is_ok());
        assert!(MemcacheClient::new("127.0.0.1").is_err());
        assert!(MemcacheClient::new(":11211").is_err());
        assert!(MemcacheClient::new("host:notaport").is_err());
    }
}
