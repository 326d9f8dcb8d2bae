use super::frames::ServerFrame;
use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;

/// 換行分幀的文字 codec - 處理幀的讀寫
pub struct Codec {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    /// 讀到一半的幀，跨越 read timeout 保留
    partial: String,
}

impl Codec {
    /// 從 TcpStream 建立 Codec
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        let writer = stream.try_clone()?;
        let reader = BufReader::new(stream);
        Ok(Self {
            reader,
            writer,
            partial: String::new(),
        })
    }

    /// 讀取一行原始幀 (已去除換行)。
    /// stream 設有 read timeout 時，逾時已讀的前綴留在累積區，
    /// 下次呼叫從斷點續讀，不得遺失。內容的解析交給上層，
    /// 格式錯誤不得中斷連線。
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let bytes_read = self.reader.read_line(&mut self.partial)?;

        if bytes_read == 0 && self.partial.is_empty() {
            // EOF - 連線關閉
            return Ok(None);
        }

        let line = std::mem::take(&mut self.partial);
        let line = line.trim();
        if line.is_empty() {
            // 空行，繼續讀取
            return self.read_line();
        }

        Ok(Some(line.to_string()))
    }

    /// 發送單一幀並立即 flush
    pub fn send_frame(&mut self, frame: &ServerFrame) -> io::Result<()> {
        writeln!(self.writer, "{}", frame.encode())?;
        self.writer.flush()?;
        Ok(())
    }

    /// 取得 peer address
    pub fn peer_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.writer.peer_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Card, Suit};
    use crate::protocol::frames::ClientFrame;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_codec_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        // Server thread
        let server_handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut codec = Codec::new(stream).unwrap();

            // 讀取就緒幀
            let line = codec.read_line().unwrap().unwrap();
            assert_eq!(ClientFrame::parse(&line), Ok(ClientFrame::Ready { seat: 1 }));

            // 回應開始訊號與一手牌
            codec.send_frame(&ServerFrame::Begin).unwrap();
            codec
                .send_frame(&ServerFrame::Cards(vec![Card::new(Suit::Heart, 5)]))
                .unwrap();
        });

        // Client
        let client_stream = TcpStream::connect(addr).unwrap();
        let mut client_codec = Codec::new(client_stream).unwrap();

        writeln!(client_codec.writer, "1").unwrap();
        client_codec.writer.flush().unwrap();

        let begin = client_codec.read_line().unwrap().unwrap();
        assert_eq!(begin, "b");
        let cards = client_codec.read_line().unwrap().unwrap();
        assert_eq!(cards, "[[0,5]]");

        server_handle.join().unwrap();
    }

    #[test]
    fn test_read_line_keeps_prefix_across_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        // 幀分兩段送出，中間停頓超過 client 的 read timeout
        let server_handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"12").unwrap();
            stream.flush().unwrap();
            thread::sleep(Duration::from_millis(300));
            stream.write_all(b"34\n").unwrap();
            stream.flush().unwrap();
        });

        let stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(100)))
            .unwrap();
        let mut codec = Codec::new(stream).unwrap();

        let line = loop {
            match codec.read_line() {
                Ok(Some(line)) => break line,
                Ok(None) => panic!("Unexpected EOF"),
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => panic!("Read error: {}", e),
            }
        };
        assert_eq!(line, "1234");

        server_handle.join().unwrap();
    }

    #[test]
    fn test_codec_skips_blank_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server_handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut codec = Codec::new(stream).unwrap();
            let line = codec.read_line().unwrap().unwrap();
            assert_eq!(line, "2");
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"\n\n2\n").unwrap();
        client.flush().unwrap();

        server_handle.join().unwrap();
    }
}
