use agora_auth::{encode_session, AuthError, Identity, SessionAuthenticator};
use agora_config::AuthConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

fn authenticator() -> SessionAuthenticator {
    SessionAuthenticator::new(&AuthConfig::default())
}

fn header_with(value: &str) -> String {
    format!("lang=en; sess:key={value}; sess:key.sig=ignored")
}

#[test]
fn issued_cookie_authenticates_its_user() {
    let auth = authenticator();
    let header = format!("lang=en; {}", auth.issue_cookie("ck1user"));

    let identity = auth.authenticate(Some(&header));

    assert_eq!(identity, Identity::Authenticated("ck1user".to_string()));
    assert_eq!(identity.user_id(), Some("ck1user"));
}

#[test]
fn raw_base64_session_value_is_accepted() {
    let auth = authenticator();
    let header = header_with(&encode_session("abc"));

    assert_eq!(auth.decode(&header), Ok("abc".to_string()));
}

#[test]
fn missing_header_or_cookie_is_anonymous() {
    let auth = authenticator();

    assert_eq!(auth.authenticate(None), Identity::Anonymous);
    assert_eq!(auth.authenticate(Some("lang=en")), Identity::Anonymous);
    assert_eq!(
        auth.decode("lang=en"),
        Err(AuthError::MissingCookie("sess:key".to_string()))
    );
}

#[test]
fn malformed_cookie_degrades_to_anonymous() {
    let auth = authenticator();

    let values = vec![
        "%%%not-base64%%%".to_string(),
        STANDARD.encode([0xff, 0xfe, 0xfd]),
        STANDARD.encode("{not json"),
        STANDARD.encode("[1,2,3]"),
    ];

    for value in values {
        let header = header_with(&value);
        assert!(matches!(
            auth.decode(&header),
            Err(AuthError::MalformedCredential(_))
        ));
        assert!(!auth.authenticate(Some(&header)).is_authenticated());
    }
}

#[test]
fn empty_passport_user_is_anonymous() {
    let auth = authenticator();

    for session in [
        r#"{}"#,
        r#"{"passport":{}}"#,
        r#"{"passport":{"user":""}}"#,
        r#"{"passport":{"user":{}}}"#,
        r#"{"passport":{"user":null}}"#,
    ] {
        let header = header_with(&STANDARD.encode(session));
        assert_eq!(auth.decode(&header), Err(AuthError::EmptyIdentity), "{session}");
        assert_eq!(auth.authenticate(Some(&header)), Identity::Anonymous);
    }
}

#[test]
fn cookie_name_comes_from_configuration() {
    let auth = SessionAuthenticator::new(&AuthConfig {
        session_cookie: "connect.session".to_string(),
    });
    let header = format!("connect.session={}", encode_session("u9"));

    assert_eq!(auth.cookie_name(), "connect.session");
    assert_eq!(
        auth.authenticate(Some(&header)),
        Identity::Authenticated("u9".to_string())
    );
    assert_eq!(authenticator().authenticate(Some(&header)), Identity::Anonymous);
}
