//! scripted transport for session tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::traits::{Peer, Socket};
use crate::common::error::RemoteError;

#[derive(Debug, Default)]
pub struct MockState {
    pub created: usize,
    pub closed: usize,
    pub connected: bool,
    pub peers: Vec<Peer>,
    pub writes: Vec<Vec<u8>>,
    pub replies: VecDeque<Result<Vec<u8>, RemoteError>>,
    pub connect_error: Option<String>,
    pub write_error: Option<String>,
}

/// cloneable handle, the test keeps one and the session owns the other
#[derive(Clone, Default)]
pub struct MockSocket {
    pub state: Arc<Mutex<MockState>>,
}

impl MockSocket {
    pub fn new() -> Self {
        MockSocket::default()
    }

    pub fn connected() -> Self {
        let socket = MockSocket::new();
        socket.state.lock().unwrap().connected = true;
        socket
    }

    pub fn push_reply(&self, data: &str) {
        self.state
            .lock()
            .unwrap()
            .replies
            .push_back(Ok(data.as_bytes().to_vec()));
    }

    pub fn writes(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// number of transport calls other than is_connected
    pub fn operations(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.created + state.closed + state.peers.len() + state.writes.len()
    }
}

#[async_trait]
impl Socket for MockSocket {
    async fn create(&mut self) -> Result<(), RemoteError> {
        self.state.lock().unwrap().created += 1;
        Ok(())
    }

    async fn connect(&mut self, peer: &Peer) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.peers.push(peer.clone());
        match state.connect_error.clone() {
            Some(msg) => Err(RemoteError::transport(msg)),
            None => {
                state.connected = true;
                Ok(())
            }
        }
    }

    async fn is_connected(&mut self) -> bool {
        self.state.lock().unwrap().connected
    }

    async fn close(&mut self) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.closed += 1;
        state.connected = false;
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<u8>, RemoteError> {
        self.state
            .lock()
            .unwrap()
            .replies
            .pop_front()
            .unwrap_or_else(|| Err(RemoteError::transport("No connection to peer")))
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        if let Some(msg) = state.write_error.clone() {
            return Err(RemoteError::transport(msg));
        }
        state.writes.push(data.to_vec());
        Ok(())
    }
}
