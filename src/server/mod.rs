use crate::executor::Executor;
use std::net::SocketAddr;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

/// Longest request line accepted over the network, newline excluded.
pub const MAX_REQUEST: usize = 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum Request {
    Line(String),
    TooLong,
    Closed,
}

/// Reads one newline-terminated request, never buffering more than
/// [`MAX_REQUEST`] bytes of it.
pub async fn read_request<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<Request> {
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(MAX_REQUEST as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if read == 0 {
        return Ok(Request::Closed);
    }
    if buf.last() != Some(&b'\n') && buf.len() > MAX_REQUEST {
        return Ok(Request::TooLong);
    }
    Ok(Request::Line(String::from_utf8_lossy(&buf).into_owned()))
}

/// Runs one request line. Blank lines yield nothing.
pub fn handle_line(exec: &mut Executor, line: &str) -> Option<String> {
    let request = line.trim();
    if request.is_empty() {
        return None;
    }
    Some(exec.run(&request.to_lowercase()).to_string())
}

/// Reply followed by an empty line, so clients know where it ends.
pub async fn write_reply<W: AsyncWrite + Unpin>(out: &mut W, reply: &str) -> io::Result<()> {
    out.write_all(reply.as_bytes()).await?;
    if !reply.ends_with('\n') {
        out.write_all(b"\n").await?;
    }
    out.write_all(b"\n").await?;
    out.flush().await
}

/// Accepts connections forever. Each one gets a fresh session.
pub async fn serve(listener: TcpListener) -> io::Result<()> {
    info!(address = %listener.local_addr()?, "listening");
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!(error = %e, "failed to accept connection");
                continue;
            }
        };
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer).await {
                error!(%peer, error = %e, "connection failed");
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr) -> io::Result<()> {
    info!(%peer, "client connected");
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut exec = Executor::new();
    loop {
        let line = match read_request(&mut reader).await? {
            Request::Line(line) => line,
            Request::Closed => break,
            Request::TooLong => {
                // 줄 경계를 잃었으므로 연결을 끊음
                warn!(%peer, limit = MAX_REQUEST, "request too long");
                write_reply(&mut writer, &format!("request exceeds {MAX_REQUEST} bytes")).await?;
                break;
            }
        };
        let Some(reply) = handle_line(&mut exec, &line) else {
            continue;
        };
        write_reply(&mut writer, &reply).await?;
    }
    debug!(%peer, tables = exec.count_tables(), "client disconnected");
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::logging::init_test_logging;
    use tokio::net::tcp::OwnedReadHalf;

    async fn start() -> SocketAddr {
        init_test_logging();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener));
        addr
    }

    async fn read_reply(lines: &mut io::Lines<BufReader<OwnedReadHalf>>) -> Vec<String> {
        let mut reply = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            if line.is_empty() {
                break;
            }
            reply.push(line);
        }
        reply
    }

    #[test]
    fn test_handle_line() {
        let mut exec = Executor::new();
        assert_eq!(handle_line(&mut exec, "   "), None);
        assert_eq!(
            handle_line(&mut exec, "CREATE TABLE T (ID INT) ENGINE LINEAR;").as_deref(),
            Some("ok\n")
        );
        assert_eq!(
            handle_line(&mut exec, "SHOW CREATE (t);").as_deref(),
            Some("CREATE TABLE t (id INT) ENGINE linear;\n")
        );
    }

    #[tokio::test]
    async fn test_write_reply() {
        let mut out = Vec::new();
        write_reply(&mut out, "ok\n").await.unwrap();
        write_reply(&mut out, "bad").await.unwrap();
        assert_eq!(out, b"ok\n\nbad\n\n");
    }

    #[tokio::test]
    async fn test_read_request_limit() {
        let mut input: &[u8] = b"select * from t;\r\nshow create (t);";
        assert_eq!(
            read_request(&mut input).await.unwrap(),
            Request::Line("select * from t;\r\n".into())
        );
        assert_eq!(
            read_request(&mut input).await.unwrap(),
            Request::Line("show create (t);".into())
        );
        assert_eq!(read_request(&mut input).await.unwrap(), Request::Closed);

        let mut exact = vec![b'a'; MAX_REQUEST];
        exact.push(b'\n');
        let mut input = exact.as_slice();
        assert!(matches!(
            read_request(&mut input).await.unwrap(),
            Request::Line(l) if l.len() == MAX_REQUEST + 1
        ));

        let long = vec![b'a'; MAX_REQUEST * 4];
        let mut input = long.as_slice();
        assert_eq!(read_request(&mut input).await.unwrap(), Request::TooLong);
    }

    #[tokio::test]
    async fn test_oversized_request_closes_connection() {
        let addr = start().await;
        let (reader, mut writer) = TcpStream::connect(addr).await.unwrap().into_split();
        let mut lines = BufReader::new(reader).lines();

        writer.write_all(&vec![b'x'; MAX_REQUEST + 1]).await.unwrap();
        let reply = read_reply(&mut lines).await;
        assert_eq!(reply, vec![format!("request exceeds {MAX_REQUEST} bytes")]);
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_over_tcp() {
        let addr = start().await;
        let (reader, mut writer) = TcpStream::connect(addr).await.unwrap().into_split();
        let mut lines = BufReader::new(reader).lines();

        writer
            .write_all(b"create table friends (name text, age int) engine column;\n\n")
            .await
            .unwrap();
        assert_eq!(read_reply(&mut lines).await, vec!["ok"]);

        writer
            .write_all(b"insert into friends values (Alpha, 18), (beta, 20);\n")
            .await
            .unwrap();
        assert_eq!(read_reply(&mut lines).await, vec!["ok"]);

        writer
            .write_all(b"select * from friends where age > 10;\n")
            .await
            .unwrap();
        assert_eq!(
            read_reply(&mut lines).await,
            vec!["name,age", "alpha,18", "beta,20"]
        );

        writer.write_all(b"select (x) from nowhere;\n").await.unwrap();
        let reply = read_reply(&mut lines).await;
        assert_eq!(reply.len(), 1);
        assert!(reply[0].contains("nowhere"));
    }

    #[tokio::test]
    async fn test_connections_do_not_share_tables() {
        let addr = start().await;
        let (_, mut first) = TcpStream::connect(addr).await.unwrap().into_split();
        let (reader, mut second) = TcpStream::connect(addr).await.unwrap().into_split();
        let mut second_lines = BufReader::new(reader).lines();

        first
            .write_all(b"create table t (a int) engine linear;\n")
            .await
            .unwrap();
        second
            .write_all(b"create table t (a text) engine linear;\n")
            .await
            .unwrap();
        assert_eq!(read_reply(&mut second_lines).await, vec!["ok"]);
    }
}
