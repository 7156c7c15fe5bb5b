//! Integration tests for the message composer.
//!
//! These drive the public API the way an application would: configure,
//! add fields, build once, then inspect the assembled message.

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use mailcompose::{
    BuildState, Composer, Error, ErrorKind, RecipientKind, RecipientList, RecipientType,
};
use proptest::prelude::*;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn composer_with_host() -> Composer {
    init_tracing();
    let mut composer = Composer::new();
    composer.set_host_name("smtp.example.com");
    composer
}

mod host_name {
    use super::*;

    #[test]
    fn returns_value_when_set_explicitly() {
        let composer = composer_with_host();
        assert_eq!(composer.host_name(), Some("smtp.example.com"));
    }

    #[test]
    fn returns_none_when_not_set() {
        let composer = Composer::new();
        assert_eq!(composer.host_name(), None);
    }
}

mod build {
    use super::*;

    #[test]
    fn twice_fails_with_illegal_state() {
        let mut composer = composer_with_host();
        composer.set_from("sender@example.com").unwrap();
        composer.add_to("recipient@example.com").unwrap();
        composer.set_subject("Test Subject").unwrap();
        composer
            .set_content("This is a test email.", "text/plain")
            .unwrap();

        let first = composer.build().unwrap();
        let err = composer.build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalState);

        // The original artifact is retained untouched.
        assert_eq!(composer.state(), BuildState::Built);
        assert!(Arc::ptr_eq(&first, composer.message().unwrap()));
        assert!(Arc::ptr_eq(
            composer.message().unwrap(),
            composer.message().unwrap()
        ));
    }

    #[test]
    fn without_from_fails() {
        let mut composer = composer_with_host();
        composer.add_to("recipient@example.com").unwrap();
        composer.add_cc("cc@example.com").unwrap();
        composer.set_subject("Test Subject").unwrap();
        composer
            .set_content("This is a test email.", "text/plain")
            .unwrap();

        let err = composer.build().unwrap_err();
        assert!(matches!(err, Error::MissingSender));
        assert_eq!(err.kind(), ErrorKind::Compose);
    }

    #[test]
    fn without_recipients_fails() {
        let mut composer = composer_with_host();
        composer.set_from("sender@example.com").unwrap();
        composer.add_reply_to("replyto@example.com").unwrap();
        composer.set_subject("Test Subject").unwrap();
        composer
            .set_content("This is a test email.", "text/plain")
            .unwrap();

        let err = composer.build().unwrap_err();
        assert!(matches!(err, Error::MissingRecipient));
        assert!(err.is_recoverable());
    }

    #[test]
    fn missing_recipient_can_be_supplied_and_retried() {
        let mut composer = composer_with_host();
        composer.set_from("sender@example.com").unwrap();
        assert!(composer.build().is_err());
        assert_eq!(composer.state(), BuildState::Open);

        composer.add_bcc("bcc@example.com").unwrap();
        let message = composer.build().unwrap();
        assert!(message.recipients(RecipientType::To).is_none());
        assert_eq!(message.recipients(RecipientType::Bcc).unwrap().len(), 1);
    }

    #[test]
    fn with_reply_to_and_headers() {
        let mut composer = composer_with_host();
        composer.set_from("sender@example.com").unwrap();
        composer.add_to("recipient@example.com").unwrap();
        composer.add_reply_to("replyto@example.com").unwrap();
        composer
            .add_header("X-Custom-Header", "CustomValue")
            .unwrap();
        composer.set_subject("Test Subject").unwrap();
        composer
            .set_content("This is a test email.", "text/plain")
            .unwrap();

        let message = composer.build().unwrap();
        let reply_to = message.reply_to().unwrap();
        assert_eq!(reply_to[0].email(), "replyto@example.com");
        assert_eq!(message.header("X-Custom-Header"), Some("CustomValue"));
        assert_eq!(message.subject(), Some("Test Subject"));
        assert_eq!(message.content_type().unwrap().to_string(), "text/plain");
        assert_eq!(message.body().unwrap().text, "This is a test email.");
    }

    #[test]
    fn with_charset() {
        let mut composer = composer_with_host();
        composer.set_from("sender@example.com").unwrap();
        composer.add_to("recipient@example.com").unwrap();
        composer.set_charset("UTF-8").unwrap();
        composer.set_subject("Subject with Charset").unwrap();

        let message = composer.build().unwrap();
        assert!(message.subject().is_some());
        assert_eq!(
            message.content_type().unwrap().to_string(),
            "text/plain; charset=UTF-8"
        );
        assert_eq!(message.charset(), Some("UTF-8"));
    }

    #[test]
    fn with_content_and_type() {
        let mut composer = composer_with_host();
        composer.set_from("sender@example.com").unwrap();
        composer.add_to("recipient@example.com").unwrap();
        composer
            .set_content("Content with ContentType", "text/html")
            .unwrap();

        let message = composer.build().unwrap();
        assert_eq!(message.content_type().unwrap().to_string(), "text/html");
    }

    #[test]
    fn with_cc_and_bcc_recipients() {
        let mut composer = composer_with_host();
        composer.set_from("sender@example.com").unwrap();
        composer.add_to("recipient@example.com").unwrap();
        composer.add_cc("cc@example.com").unwrap();
        composer.add_bcc("bcc@example.com").unwrap();

        let message = composer.build().unwrap();
        assert!(!message.recipients(RecipientType::Cc).unwrap().is_empty());
        assert!(!message.recipients(RecipientType::Bcc).unwrap().is_empty());
    }

    #[test]
    fn omits_empty_categories() {
        let mut composer = composer_with_host();
        composer.set_from("sender@example.com").unwrap();
        composer.add_cc("cc@example.com").unwrap();

        let message = composer.build().unwrap();
        assert!(message.recipients(RecipientType::To).is_none());
        assert!(message.recipients(RecipientType::Bcc).is_none());
        assert!(message.reply_to().is_none());
    }

    #[test]
    fn renders_end_to_end() {
        let mut composer = composer_with_host();
        composer
            .set_from_named("sender@example.com", "Sender")
            .unwrap();
        composer.add_to("recipient@example.com").unwrap();
        composer.add_bcc("hidden@example.com").unwrap();
        composer
            .add_header("X-Custom-Header", "CustomValue")
            .unwrap();
        composer.set_subject("Test Subject").unwrap();
        composer
            .set_content("This is a test email.", "text/plain")
            .unwrap();
        composer
            .set_sent_date(Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap())
            .unwrap();

        let raw = composer.build().unwrap().to_rfc5322().unwrap();
        let text = String::from_utf8(raw).unwrap();
        assert!(text.starts_with("Date: Fri, 15 Mar 2024 09:00:00 +0000\r\n"));
        assert!(text.contains("From: \"Sender\" <sender@example.com>\r\n"));
        assert!(text.contains("X-Custom-Header: CustomValue\r\n"));
        assert!(text.ends_with("\r\n\r\nThis is a test email.\r\n"));
        assert!(!text.contains("hidden@example.com"));
    }
}

mod rendering {
    use super::*;

    fn ready() -> Composer {
        let mut composer = composer_with_host();
        composer.set_from("sender@example.com").unwrap();
        composer.add_to("recipient@example.com").unwrap();
        composer.add_bcc("hidden@example.com").unwrap();
        composer
    }

    #[test]
    fn content_type_cannot_add_header_lines() {
        let mut composer = ready();
        let err = composer
            .set_content("hi", "text/plain; charset=utf-8\r\nBcc: evil@attacker.com")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = composer
            .set_content("hi", "text\r\nBcc: evil@attacker.com\r\nX/plain")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = composer.set_charset("utf-8\r\nX-Injected: yes").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        composer.set_content("hi", "text/plain").unwrap();
        let text = String::from_utf8(composer.build().unwrap().to_rfc5322().unwrap()).unwrap();
        let header_block = text.split("\r\n\r\n").next().unwrap();
        assert!(!header_block.to_lowercase().contains("bcc"));
        assert!(!text.contains("evil@attacker.com"));
    }

    #[test]
    fn non_ascii_body_names_its_charset() {
        let mut composer = ready();
        composer.set_charset("iso-8859-1").unwrap();
        composer.set_content("Grüße", "text/plain").unwrap();

        let message = composer.build().unwrap();
        let text = String::from_utf8(message.to_rfc5322().unwrap()).unwrap();
        assert!(text.contains("Content-Type: text/plain; charset=windows-1252\r\n"));
        assert!(text.contains("Content-Transfer-Encoding: base64\r\n"));
        assert_eq!(message.content_type().unwrap().to_string(), "text/plain");
    }

    #[test]
    fn long_subject_is_split_into_short_words() {
        let mut composer = ready();
        composer.set_subject("Über ".repeat(30)).unwrap();

        let text = String::from_utf8(composer.build().unwrap().to_rfc5322().unwrap()).unwrap();
        let header_block = text.split("\r\n\r\n").next().unwrap();
        let words: Vec<_> = header_block
            .split_whitespace()
            .filter(|w| w.starts_with("=?"))
            .collect();
        assert!(words.len() > 1);
        assert!(words.iter().all(|w| w.len() <= 75));
    }

    #[test]
    fn non_ascii_custom_header_is_encoded() {
        let mut composer = ready();
        composer.add_header("X-Greeting", "Grüße").unwrap();

        let text = String::from_utf8(composer.build().unwrap().to_rfc5322().unwrap()).unwrap();
        assert!(text.contains("X-Greeting: =?UTF-8?B?"));
        assert!(text.is_ascii());
    }
}

mod reply_to {
    use super::*;

    #[test]
    fn with_email_only() {
        let mut composer = Composer::new();
        composer.add_reply_to("replyto@example.com").unwrap();
        assert_eq!(
            composer.reply_to_addresses()[0].email(),
            "replyto@example.com"
        );
    }

    #[test]
    fn with_email_and_name() {
        let mut composer = Composer::new();
        composer
            .add_reply_to_named("replyto@example.com", "Reply To")
            .unwrap();
        let address = &composer.reply_to_addresses()[0];
        assert_eq!(address.email(), "replyto@example.com");
        assert_eq!(address.name(), Some("Reply To"));
    }

    #[test]
    fn with_email_name_and_charset() {
        let mut composer = Composer::new();
        composer.set_charset("UTF-8").unwrap();
        composer
            .add_recipient_with_charset(
                RecipientKind::ReplyTo,
                "replyto@example.com",
                Some("67"),
                Some("UTF-8"),
            )
            .unwrap();
        let address = &composer.reply_to_addresses()[0];
        assert_eq!(address.name(), Some("67"));
        assert_eq!(address.charset(), Some("UTF-8"));
    }

    #[test]
    fn with_invalid_email() {
        let mut composer = Composer::new();
        let err = composer.add_reply_to("invalid-email").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(composer.reply_to_addresses().is_empty());
    }

    #[test]
    fn with_null_email_is_fault() {
        let mut list = RecipientList::new(RecipientKind::ReplyTo);
        let err = list.add_one(None, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fault);
        assert!(!err.is_recoverable());
    }
}

mod bulk_recipients {
    use super::*;

    #[test]
    fn bcc_single() {
        let mut composer = Composer::new();
        composer.add_bcc("singlebcc@example.com").unwrap();
        assert_eq!(composer.bcc_addresses().len(), 1);
    }

    #[test]
    fn bcc_multiple_in_order() {
        let mut composer = Composer::new();
        composer
            .add_bccs(&["bcc1@example.com", "bcc2@example.com"])
            .unwrap();
        let emails: Vec<_> = composer.bcc_addresses().iter().map(|m| m.email()).collect();
        assert_eq!(emails, ["bcc1@example.com", "bcc2@example.com"]);
    }

    #[test]
    fn bcc_empty_fails() {
        let mut composer = Composer::new();
        let empty: [&str; 0] = [];
        let err = composer.add_bccs(&empty).unwrap_err();
        assert!(matches!(err, Error::NoAddresses));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn bcc_null_collection_fails() {
        let mut list = RecipientList::new(RecipientKind::Bcc);
        let err = list.add_many(None::<&[&str]>).unwrap_err();
        assert!(matches!(err, Error::NoAddresses));
    }

    #[test]
    fn cc_single() {
        let mut composer = Composer::new();
        composer.add_cc("testcc@example.com").unwrap();
        assert_eq!(composer.cc_addresses().len(), 1);
    }

    #[test]
    fn cc_multiple() {
        let mut composer = Composer::new();
        let ccs = vec!["cc1@example.com".to_string(), "cc2@example.com".to_string()];
        composer.add_ccs(&ccs).unwrap();
        assert_eq!(composer.cc_addresses().len(), 2);
    }

    #[test]
    fn cc_empty_fails() {
        let mut composer = Composer::new();
        let empty: Vec<String> = Vec::new();
        assert!(matches!(composer.add_ccs(&empty), Err(Error::NoAddresses)));
    }

    #[test]
    fn mixed_batch_is_all_or_nothing() {
        let mut composer = Composer::new();
        let err = composer
            .add_tos(&["good@example.com", "not an address"])
            .unwrap_err();
        assert!(err.is_recoverable());
        assert!(composer.to_addresses().is_empty());
    }
}

mod headers {
    use super::*;

    #[test]
    fn add_header() {
        let mut composer = Composer::new();
        composer.add_header("X-Test-Header", "HeaderValue").unwrap();
        assert!(composer.headers().contains("X-Test-Header"));
        assert_eq!(composer.headers().get("X-Test-Header"), Some("HeaderValue"));
    }

    #[test]
    fn empty_name_fails() {
        let mut composer = Composer::new();
        let err = composer.add_header("", "SomeValue").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(composer.headers().is_empty());
    }

    #[test]
    fn empty_value_fails() {
        let mut composer = Composer::new();
        let err = composer.add_header("X-Test-Header", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(composer.headers().is_empty());
    }

    #[test]
    fn reserved_name_fails() {
        let mut composer = Composer::new();
        for name in ["Bcc", "subject", "Content-Type"] {
            let err = composer.add_header(name, "value").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert!(composer.headers().is_empty());
    }

    #[test]
    fn duplicate_overwrites_in_place() {
        let mut composer = Composer::new();
        composer.add_header("X-A", "1").unwrap();
        composer.add_header("X-B", "2").unwrap();
        composer.add_header("X-A", "3").unwrap();
        let entries: Vec<_> = composer.headers().iter().collect();
        assert_eq!(entries, [("X-A", "3"), ("X-B", "2")]);
    }
}

mod transport {
    use super::*;

    #[test]
    fn mail_session() {
        let mut composer = composer_with_host();
        let session = composer.mail_session().unwrap();
        assert_eq!(session.host(), "smtp.example.com");
        assert_eq!(session.port(), 25);
    }

    #[test]
    fn mail_session_with_malformed_host() {
        let mut composer = Composer::new();
        composer.set_host_name("smtp.example.com\r\nQUIT");
        let err = composer.mail_session().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn mail_session_without_host() {
        let mut composer = Composer::new();
        let err = composer.mail_session().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn socket_connection_timeout() {
        let mut composer = Composer::new();
        composer.set_socket_connection_timeout(30_000);
        assert_eq!(composer.socket_connection_timeout(), 30_000);
    }

    #[test]
    fn sent_date() {
        let mut composer = Composer::new();
        let date = Utc::now();
        composer.set_sent_date(date).unwrap();
        assert_eq!(composer.sent_date(), Some(date));
    }

    #[test]
    fn set_from() {
        let mut composer = Composer::new();
        composer.set_from("from@example.com").unwrap();
        assert!(composer.from_address().is_some());
    }
}

proptest! {
    #[test]
    fn valid_addresses_are_kept_verbatim(
        local in "[a-z0-9][a-z0-9._+-]{0,15}[a-z0-9]",
        domain in "[a-z]{2,10}\\.[a-z]{2,5}",
    ) {
        prop_assume!(!local.contains(".."));
        let raw = format!("{local}@{domain}");
        let mut composer = Composer::new();
        composer.add_to(&raw).unwrap();
        prop_assert_eq!(composer.to_addresses()[0].email(), raw.as_str());
    }

    #[test]
    fn headers_round_trip(name in "X-[A-Za-z0-9-]{1,20}", value in "[ -~]{1,40}") {
        let mut composer = Composer::new();
        composer.add_header(&name, &value).unwrap();
        prop_assert_eq!(composer.headers().get(&name), Some(value.as_str()));
    }
}
