// SPDX-License-Identifier: MIT 
// Copyright (c) 2025 Thomas Junier 

use std::{
    cell::RefCell,
    fs,
    io::{BufRead, BufReader, Cursor, Read, Write},
    net::TcpListener,
    path::Path,
    thread::{self, JoinHandle},
};

use sigblast::{
    blast::client::{AlignmentService, SearchRequest},
    errors::SigBlastError,
    runner,
};

// Stands in for the remote service: answers every search with the contents of a report file, and
// remembers the requests it got.
#[allow(dead_code)]
pub struct CannedService {
    report: Result<Vec<u8>, String>,
    pub requests: RefCell<Vec<SearchRequest>>,
}

#[allow(dead_code)]
impl CannedService {
    pub fn from_file(path: &str) -> Self {
        let report = fs::read(path).expect("read canned report");
        CannedService {
            report: Ok(report),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn from_bytes(report: impl Into<Vec<u8>>) -> Self {
        CannedService {
            report: Ok(report.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(msg: &str) -> Self {
        CannedService {
            report: Err(String::from(msg)),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn num_requests(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl AlignmentService for CannedService {
    type Handle = Cursor<Vec<u8>>;

    fn qblast(&self, request: &SearchRequest) -> Result<Self::Handle, SigBlastError> {
        self.requests.borrow_mut().push(request.clone());
        match &self.report {
            Ok(bytes) => Ok(Cursor::new(bytes.clone())),
            Err(msg) => Err(SigBlastError::Http(msg.clone())),
        }
    }
}

/// Runs the whole pipeline the way the binary does, and returns what it printed.
#[allow(dead_code)]
pub fn blast_output(fasta: &str, threshold: f64, service: &CannedService) -> String {
    let mut out: Vec<u8> = Vec::new();
    let result = runner::perform_blast(Path::new(fasta), threshold, service, &mut out);
    runner::report_outcome(result, &mut out);
    String::from_utf8(out).expect("utf8")
}

// One request as seen by `ScriptedServer`: "METHOD target" and the (form) body.
#[allow(dead_code)]
#[derive(Debug)]
pub struct SeenRequest {
    pub line: String,
    pub body: String,
}

// A one-shot HTTP server on 127.0.0.1 that answers the n-th request with the n-th page, then stops
// and hands back the requests it received. It must be given exactly as many pages as the client
// will make requests.
#[allow(dead_code)]
pub struct ScriptedServer {
    pub url: String,
    handle: JoinHandle<Vec<SeenRequest>>,
}

#[allow(dead_code)]
impl ScriptedServer {
    pub fn start(pages: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for page in pages {
                let (mut stream, _) = listener.accept().expect("accept");
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

                let mut line = String::new();
                reader.read_line(&mut line).expect("request line");
                let line = line
                    .trim_end()
                    .rsplit_once(' ')
                    .map(|(method_target, _version)| method_target.to_string())
                    .unwrap_or_default();

                let mut content_length = 0;
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).expect("header");
                    let header = header.trim_end();
                    if header.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = header.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().expect("content length");
                        }
                    }
                }
                let mut body = vec![0; content_length];
                reader.read_exact(&mut body).expect("body");
                seen.push(SeenRequest {
                    line,
                    body: String::from_utf8(body).expect("utf8 body"),
                });

                write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    page.len(),
                    page
                )
                .expect("write response");
                stream.flush().expect("flush");
            }
            seen
        });
        ScriptedServer {
            url: format!("http://127.0.0.1:{}/Blast.cgi", port),
            handle,
        }
    }

    pub fn requests(self) -> Vec<SeenRequest> {
        self.handle.join().expect("server thread")
    }
}

#[allow(dead_code)]
pub fn put_reply(rid: &str, rtoe: u64) -> String {
    format!(
        "<html><body>\n<!--QBlastInfoBegin\n    RID = {}\n    RTOE = {}\nQBlastInfoEnd\n-->\n</body></html>",
        rid, rtoe
    )
}

#[allow(dead_code)]
pub fn search_info(status: &str) -> String {
    format!(
        "<html><body>\n<!--QBlastInfoBegin\n\tStatus={}\nQBlastInfoEnd\n-->\n</body></html>",
        status
    )
}
