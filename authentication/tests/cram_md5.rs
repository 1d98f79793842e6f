// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use authentication::{
    AuthError, Authenticatee, Authenticator, Config, Context, CramMd5Authenticatee,
    CramMd5Authenticator, Credential, Disposition, Mailbox, Message, Pid, Registry, Router,
    Secrets,
};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::timeout;

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
enum Kind {
    Direct,
    Module,
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn create_authenticator(kind: Kind, router: &Router, secrets: &Secrets) -> Box<dyn Authenticator> {
    match kind {
        Kind::Direct => Box::new(CramMd5Authenticator::new(
            router.clone(),
            secrets.clone(),
            &Config::default(),
        )),
        Kind::Module => {
            let mut registry = Registry::default();
            registry.register_authenticator(
                "org_test_crammd5",
                |context: &Context| -> Box<dyn Authenticator> {
                    Box::new(CramMd5Authenticator::new(
                        context.router.clone(),
                        context.secrets.clone(),
                        &context.config,
                    ))
                },
            );
            let context = Context {
                router: router.clone(),
                secrets: secrets.clone(),
                config: Config::default().with_authenticator("org_test_crammd5"),
            };
            registry.create_authenticator(&context).unwrap()
        }
    }
}

struct Setup {
    router: Router,
    secrets: Secrets,
    rendezvous: Mailbox,
}

fn setup() -> Setup {
    init_logger();
    let router = Router::new("127.0.0.1", 5050);
    let secrets = Secrets::new();
    secrets.load(vec![Credential::new("benh", "secret")]);
    let rendezvous = router.spawn("rendezvous").unwrap();
    Setup {
        router,
        secrets,
        rendezvous,
    }
}

/// Waits for the authenticatee to announce itself and returns its pid.
async fn announced(rendezvous: &mut Mailbox) -> Pid {
    let envelope = timeout(TIMEOUT, rendezvous.next()).await.unwrap().unwrap();
    assert!(matches!(envelope.body, Message::Announce { .. }));
    envelope.from
}

async fn success(kind: Kind) {
    let Setup {
        router,
        secrets,
        mut rendezvous,
    } = setup();

    let mut authenticatee = CramMd5Authenticatee::new(router.clone());
    let client = authenticatee
        .authenticate(
            rendezvous.pid(),
            rendezvous.pid(),
            Credential::new("benh", "secret"),
        )
        .unwrap();
    let pid = announced(&mut rendezvous).await;

    let mut authenticator = create_authenticator(kind, &router, &secrets);
    authenticator.initialize(pid).unwrap();
    let server = authenticator.authenticate().unwrap();

    assert_eq!(timeout(TIMEOUT, client).await.unwrap(), Ok(true));
    assert_eq!(
        timeout(TIMEOUT, server).await.unwrap(),
        Ok(Some(String::from("benh")))
    );
}

/// Wrong secret for a known principal.
async fn wrong_secret(kind: Kind) {
    let Setup {
        router,
        secrets,
        mut rendezvous,
    } = setup();

    let mut authenticatee = CramMd5Authenticatee::new(router.clone());
    let client = authenticatee
        .authenticate(
            rendezvous.pid(),
            rendezvous.pid(),
            Credential::new("benh", "secret2"),
        )
        .unwrap();
    let pid = announced(&mut rendezvous).await;

    let mut authenticator = create_authenticator(kind, &router, &secrets);
    authenticator.initialize(pid).unwrap();
    let server = authenticator.authenticate().unwrap();

    assert_eq!(timeout(TIMEOUT, client).await.unwrap(), Ok(false));
    assert_eq!(timeout(TIMEOUT, server).await.unwrap(), Ok(None));
}

/// Principal without a secret.
async fn unknown_principal(kind: Kind) {
    let Setup {
        router,
        secrets,
        mut rendezvous,
    } = setup();

    let mut authenticatee = CramMd5Authenticatee::new(router.clone());
    let client = authenticatee
        .authenticate(
            rendezvous.pid(),
            rendezvous.pid(),
            Credential::new("vinod", "secret"),
        )
        .unwrap();
    let pid = announced(&mut rendezvous).await;

    let mut authenticator = create_authenticator(kind, &router, &secrets);
    authenticator.initialize(pid).unwrap();
    let server = authenticator.authenticate().unwrap();

    assert_eq!(timeout(TIMEOUT, client).await.unwrap(), Ok(false));
    assert_eq!(timeout(TIMEOUT, server).await.unwrap(), Ok(None));
}

/// The authenticator goes away while its challenge is still in flight.
async fn destroyed_while_pending(kind: Kind) {
    let Setup {
        router,
        secrets,
        mut rendezvous,
    } = setup();

    let mut authenticatee = CramMd5Authenticatee::new(router.clone());
    let mut client = authenticatee
        .authenticate(
            rendezvous.pid(),
            rendezvous.pid(),
            Credential::new("benh", "secret"),
        )
        .unwrap();
    let pid = announced(&mut rendezvous).await;

    let target = pid.clone();
    let challenge = router.intercept(
        move |envelope| {
            envelope.to == target && matches!(envelope.body, Message::Step { .. })
        },
        Disposition::Drop,
    );

    let mut authenticator = create_authenticator(kind, &router, &secrets);
    authenticator.initialize(pid).unwrap();
    let mut server = authenticator.authenticate().unwrap();

    let challenge = timeout(TIMEOUT, challenge).await.unwrap().unwrap();
    assert!(matches!(challenge.body, Message::Step { .. }));
    assert!(server.is_pending());

    drop(authenticator);

    assert!(matches!(
        timeout(TIMEOUT, server).await.unwrap(),
        Err(AuthError::Aborted(_))
    ));
    assert!(client.is_pending());
}

/// A response arriving after teardown neither resolves anything nor gets an answer.
async fn response_after_teardown(kind: Kind) {
    let Setup {
        router,
        secrets,
        mut rendezvous,
    } = setup();

    let mut authenticatee = CramMd5Authenticatee::new(router.clone());
    let mut client = authenticatee
        .authenticate(
            rendezvous.pid(),
            rendezvous.pid(),
            Credential::new("benh", "secret"),
        )
        .unwrap();
    let pid = announced(&mut rendezvous).await;

    let source = pid.clone();
    let response = router.intercept(
        move |envelope| {
            envelope.from == source && matches!(envelope.body, Message::Step { .. })
        },
        Disposition::Drop,
    );

    let mut authenticator = create_authenticator(kind, &router, &secrets);
    authenticator.initialize(pid).unwrap();
    let server = authenticator.authenticate().unwrap();

    let response = timeout(TIMEOUT, response).await.unwrap().unwrap();
    drop(authenticator);
    assert!(matches!(
        timeout(TIMEOUT, server).await.unwrap(),
        Err(AuthError::Aborted(_))
    ));

    router.send(&response.from, &response.to, response.body);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(client.is_pending());

    drop(authenticatee);
    assert!(matches!(
        timeout(TIMEOUT, client).await.unwrap(),
        Err(AuthError::Aborted(_))
    ));
}

#[tokio::test]
async fn success_direct() {
    success(Kind::Direct).await;
}

#[tokio::test]
async fn success_module() {
    success(Kind::Module).await;
}

#[tokio::test]
async fn wrong_secret_direct() {
    wrong_secret(Kind::Direct).await;
}

#[tokio::test]
async fn wrong_secret_module() {
    wrong_secret(Kind::Module).await;
}

#[tokio::test]
async fn unknown_principal_direct() {
    unknown_principal(Kind::Direct).await;
}

#[tokio::test]
async fn unknown_principal_module() {
    unknown_principal(Kind::Module).await;
}

#[tokio::test]
async fn destroyed_while_pending_direct() {
    destroyed_while_pending(Kind::Direct).await;
}

#[tokio::test]
async fn destroyed_while_pending_module() {
    destroyed_while_pending(Kind::Module).await;
}

#[tokio::test]
async fn response_after_teardown_direct() {
    response_after_teardown(Kind::Direct).await;
}

#[tokio::test]
async fn response_after_teardown_module() {
    response_after_teardown(Kind::Module).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn many_concurrent_attempts() {
    let Setup {
        router,
        secrets,
        mut rendezvous,
    } = setup();
    let registry = Registry::default();
    let context = Context {
        router: router.clone(),
        secrets: secrets.clone(),
        config: Config::default(),
    };

    let mut authenticatees = Vec::new();
    let mut clients = Vec::new();
    for i in 0..16 {
        let secret = if i % 2 == 0 { "secret" } else { "wrong" };
        let mut authenticatee = registry.create_authenticatee(&context).unwrap();
        clients.push(
            authenticatee
                .authenticate(
                    rendezvous.pid(),
                    rendezvous.pid(),
                    Credential::new("benh", secret),
                )
                .unwrap(),
        );
        authenticatees.push(authenticatee);
    }

    let mut authenticators = Vec::new();
    let mut servers = Vec::new();
    for _ in 0..16 {
        let pid = announced(&mut rendezvous).await;
        let mut authenticator = registry.create_authenticator(&context).unwrap();
        authenticator.initialize(pid).unwrap();
        servers.push(authenticator.authenticate().unwrap());
        authenticators.push(authenticator);
    }

    for (i, client) in clients.into_iter().enumerate() {
        assert_eq!(timeout(TIMEOUT, client).await.unwrap(), Ok(i % 2 == 0));
    }
    let accepted = futures::future::join_all(servers)
        .await
        .into_iter()
        .filter(|outcome| outcome == &Ok(Some(String::from("benh"))))
        .count();
    assert_eq!(accepted, 8);
}
