use crate::{
    error::{ProviderErrorCode, ProviderRpcError, StorageError},
    persistence::KeyValueStore,
    provider::{Provider, ProviderHandle, ProviderIdentity, RequestArguments},
};
use serde_json::Value;
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    future::Future,
};
use tokio::sync::oneshot;

type Reply = Result<Value, ProviderRpcError>;

enum Response {
    Ready(Reply),
    Pending(oneshot::Receiver<Reply>),
}

/// Provider answering from scripted responses, in order, per method.
#[derive(Default)]
pub struct MockProvider {
    responses: RefCell<HashMap<String, VecDeque<Response>>>,
    calls: RefCell<Vec<RequestArguments>>,
}

impl MockProvider {
    pub fn respond(&self, method: &str, reply: Reply) {
        self.push(method, Response::Ready(reply));
    }

    /// the request stays pending until the returned sender is used
    pub fn respond_later(&self, method: &str) -> oneshot::Sender<Reply> {
        let (sender, receiver) = oneshot::channel();
        self.push(method, Response::Pending(receiver));
        sender
    }

    pub fn calls(&self) -> Vec<RequestArguments> {
        self.calls.borrow().clone()
    }

    fn push(&self, method: &str, response: Response) {
        self.responses
            .borrow_mut()
            .entry(method.to_owned())
            .or_default()
            .push_back(response);
    }
}

impl Provider for MockProvider {
    fn request(&self, arguments: RequestArguments) -> impl Future<Output = Reply> {
        let response = self
            .responses
            .borrow_mut()
            .get_mut(&arguments.method)
            .and_then(VecDeque::pop_front);
        let method = arguments.method.clone();
        self.calls.borrow_mut().push(arguments);

        async move {
            match response {
                Some(Response::Ready(reply)) => reply,
                Some(Response::Pending(receiver)) => receiver
                    .await
                    .unwrap_or_else(|_| Err(ProviderRpcError::internal("reply dropped"))),
                None => Err(ProviderRpcError::new(
                    ProviderErrorCode::UnsupportedMethod,
                    format!("no scripted response for `{method}'"),
                )),
            }
        }
    }
}

pub fn handle(identifier: &str) -> ProviderHandle<MockProvider> {
    ProviderHandle::new(
        ProviderIdentity {
            uuid: format!("{identifier}-uuid"),
            identifier: identifier.to_owned(),
            display_name: identifier.to_owned(),
            icon: "data:image/svg+xml,<svg/>".to_owned(),
        },
        MockProvider::default(),
    )
}

/// Storage failing every operation, as `localStorage` does when disabled.
pub struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("private browsing".to_owned()))
    }

    fn set(&self, key: &str, _: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            key: key.to_owned(),
            reason: "quota exceeded".to_owned(),
        })
    }

    fn remove(&self, _: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("private browsing".to_owned()))
    }
}
