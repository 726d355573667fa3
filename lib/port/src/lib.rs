//! Port allocation is advisory only — the authoritative claim is the
//! server's own bind. This module just gives the caller a
//! best-effort free port to try, and a way to recognize when a bind
//! attempt failed because something else beat it to the punch.

use spindb_types::{Error, Result};
use tokio::net::TcpListener;

/// Attempts to bind a TCP listener on `127.0.0.1:<port>`. Success
/// closes it immediately and returns `true`; `EADDRINUSE` (or
/// equivalent) returns `false`; any other I/O error propagates.
pub async fn is_port_available(port: u16) -> Result<bool> {
  match TcpListener::bind(("127.0.0.1", port)).await {
    Ok(listener) => {
      drop(listener);
      Ok(true)
    }
    Err(e)
      if e.kind() == std::io::ErrorKind::AddrInUse =>
    {
      Ok(false)
    }
    Err(e) => Err(Error::Io(e.to_string())),
  }
}

/// Linear scan starting at `base`, returning the first free port
/// found within `max_probes` attempts (default 100).
pub async fn find_next_free(
  base: u16,
  max_probes: u32,
) -> Result<u16> {
  let max_probes = if max_probes == 0 { 100 } else { max_probes };
  let mut port = base;
  for _ in 0..max_probes {
    if is_port_available(port).await? {
      return Ok(port);
    }
    port = port.checked_add(1).ok_or_else(|| {
      Error::InvalidInput("port range exhausted".into())
    })?;
  }
  Err(Error::InvalidInput(format!(
    "no free port found in [{base}, {})",
    base as u32 + max_probes
  )))
}

/// Returns `count` contiguous free ports starting near `base`. If a
/// port in the middle of a candidate run is occupied, the scan
/// restarts from the port just after the occupied one. Fails with
/// `NoFreePorts` (mapped to `Error::InvalidInput`) after probing
/// `base+100` without success.
pub async fn find_consecutive_free(
  count: u16,
  base: u16,
) -> Result<Vec<u16>> {
  if count == 0 {
    return Ok(Vec::new());
  }
  let ceiling = base as u32 + 100;
  let mut start = base;
  'outer: loop {
    if start as u32 + count as u32 > ceiling {
      return Err(Error::InvalidInput(format!(
        "no {count} consecutive free ports found starting at {base}"
      )));
    }
    let mut run = Vec::with_capacity(count as usize);
    for offset in 0..count {
      let port = start + offset;
      if is_port_available(port).await? {
        run.push(port);
      } else {
        start = port + 1;
        continue 'outer;
      }
    }
    return Ok(run);
  }
}

/// Substrings (case-insensitive) that classify an error message as a
/// port-in-use failure. Kept as a fixed, reviewable corpus rather
/// than scattered string matches at each call site.
const PORT_IN_USE_SUBSTRINGS: &[&str] = &[
  "address already in use",
  "eaddrinuse",
  "could not bind",
  "socket already in use",
];

/// Classifies an error message as port-in-use. Matches any of the
/// fixed substrings, or the conjunction of "port" and "in use",
/// case-insensitively.
pub fn is_port_in_use_error(message: &str) -> bool {
  let lower = message.to_lowercase();
  PORT_IN_USE_SUBSTRINGS
    .iter()
    .any(|needle| lower.contains(needle))
    || (lower.contains("port") && lower.contains("in use"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn bound_port_is_unavailable_while_held() {
    let listener =
      TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    assert!(!is_port_available(port).await.unwrap());
    drop(listener);
    assert!(is_port_available(port).await.unwrap());
  }

  #[tokio::test]
  async fn find_next_free_skips_occupied_port() {
    let listener =
      TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let held = listener.local_addr().unwrap().port();
    let found = find_next_free(held, 100).await.unwrap();
    assert_ne!(found, held);
  }

  #[tokio::test]
  async fn find_consecutive_free_returns_contiguous_run() {
    let ports = find_consecutive_free(3, 20100).await.unwrap();
    assert_eq!(ports.len(), 3);
    assert_eq!(ports[1], ports[0] + 1);
    assert_eq!(ports[2], ports[0] + 2);
  }

  #[test]
  fn classifier_positive_corpus() {
    let positive = [
      "Error: Address already in use (os error 98)",
      "bind: EADDRINUSE",
      "could not bind to socket",
      "Socket already in use by another process",
      "the requested port is already in use",
    ];
    for message in positive {
      assert!(
        is_port_in_use_error(message),
        "expected positive match: {message}"
      );
    }
  }

  #[test]
  fn classifier_negative_corpus() {
    let negative = [
      "permission denied",
      "no such file or directory",
      "connection refused",
      "invalid argument",
    ];
    for message in negative {
      assert!(
        !is_port_in_use_error(message),
        "expected negative match: {message}"
      );
    }
  }
}
