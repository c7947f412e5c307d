// SPDX-License-Identifier: MIT 
// Copyright (c) 2025 Thomas Junier 

mod common;

use std::{fs, time::Duration};

use crate::common::utils::{put_reply, search_info, ScriptedServer};

use sigblast::blast::client::{AlignmentService, NcbiWww, SearchRequest};
use sigblast::blast::record::AlignmentRecord;
use sigblast::errors::SigBlastError;

fn client(server: &ScriptedServer) -> NcbiWww {
    let mut www = NcbiWww::new(server.url.clone());
    www.poll_interval = Duration::from_millis(5);
    www
}

#[test]
fn submits_polls_and_fetches() {
    let report = fs::read_to_string("tests/data/report.json").expect("read report");
    let server = ScriptedServer::start(vec![
        put_reply("R1", 0),
        search_info("WAITING"),
        search_info("READY"),
        report,
    ]);
    let www = client(&server);

    let handle = www
        .qblast(&SearchRequest::blastn_nt(">q\nACGT\n"))
        .expect("search");
    let record = AlignmentRecord::read(handle).expect("parse");
    assert_eq!(record.alignments.len(), 2);

    let requests = server.requests();
    assert_eq!(requests.len(), 4);

    assert_eq!(requests[0].line, "POST /Blast.cgi");
    assert_eq!(
        requests[0].body,
        "CMD=Put&PROGRAM=blastn&DATABASE=nt&QUERY=%3Eq%0AACGT%0A&HITLIST_SIZE=50&EXPECT=10&TOOL=sigblast"
    );

    // WAITING keeps the client polling until READY.
    for req in &requests[1..3] {
        assert_eq!(
            req.line,
            "GET /Blast.cgi?CMD=Get&FORMAT_OBJECT=SearchInfo&RID=R1"
        );
    }
    assert_eq!(
        requests[3].line,
        "GET /Blast.cgi?CMD=Get&FORMAT_TYPE=JSON2_S&RID=R1"
    );
}

#[test]
fn put_form_carries_request_and_contact() {
    let server = ScriptedServer::start(vec![
        put_reply("R2", 0),
        search_info("READY"),
        String::from(r#"{"BlastOutput2": []}"#),
    ]);
    let mut www = client(&server);
    www.email = Some(String::from("me@example.org"));
    www.tool = String::from("mytool");

    let request = SearchRequest {
        hitlist_size: 5,
        expect: 0.5,
        database: String::from("refseq_rna"),
        ..SearchRequest::blastn_nt("ACGT")
    };
    www.qblast(&request).expect("search");

    let requests = server.requests();
    assert_eq!(
        requests[0].body,
        "CMD=Put&PROGRAM=blastn&DATABASE=refseq_rna&QUERY=ACGT&HITLIST_SIZE=5&EXPECT=0.5&TOOL=mytool&EMAIL=me%40example.org"
    );
    assert_eq!(
        requests[2].line,
        "GET /Blast.cgi?CMD=Get&FORMAT_TYPE=JSON2_S&RID=R2"
    );
}

#[test]
fn failed_search_is_a_service_error() {
    let server = ScriptedServer::start(vec![
        put_reply("R1", 0),
        search_info("WAITING"),
        search_info("FAILED"),
    ]);
    let www = client(&server);

    match www.qblast(&SearchRequest::blastn_nt("ACGT")) {
        Err(SigBlastError::Service(msg)) => assert_eq!(msg, "Search R1 failed"),
        Err(e) => panic!("expected a service error, got {:?}", e),
        Ok(_) => panic!("expected a service error"),
    }
    // No report fetch after FAILED.
    assert_eq!(server.requests().len(), 3);
}

#[test]
fn unknown_search_is_a_service_error() {
    let server = ScriptedServer::start(vec![put_reply("R9", 0), search_info("UNKNOWN")]);
    let www = client(&server);

    match www.qblast(&SearchRequest::blastn_nt("ACGT")) {
        Err(SigBlastError::Service(msg)) => {
            assert_eq!(msg, "Search R9 expired or is unknown to the service")
        }
        Err(e) => panic!("expected a service error, got {:?}", e),
        Ok(_) => panic!("expected a service error"),
    }
    assert_eq!(server.requests().len(), 2);
}

#[test]
fn rejected_submission_is_a_service_error() {
    let server = ScriptedServer::start(vec![String::from(
        r#"<div class="error msInf"><p class="error">Message ID#24 Error: Failed to read the Blast query</p></div>"#,
    )]);
    let www = client(&server);

    assert!(matches!(
        www.qblast(&SearchRequest::blastn_nt("")),
        Err(SigBlastError::Service(_))
    ));
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.starts_with("CMD=Put&"));
}
