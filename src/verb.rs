//! Verb registry.
//!
//! # Responsibilities
//! - Enumerate every operation the transport knows how to issue
//! - Classify each verb: input body, heavy (data plane), volatile (mutating)
//! - Derive the HTTP method from that classification
//!
//! # Design Decisions
//! - Closed enum with exhaustive matches; adding a verb forces a decision in
//!   every classifier
//! - Input body dominates the method choice: `PUT` even for reads

use std::fmt;
use std::str::FromStr;

use reqwest::Method;

use crate::error::Error;

/// A remote operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    Exists,
    Remove,
    Get,
    Set,
    List,
    Copy,
    Move,
    Link,

    WriteFile,
    ReadFile,
    PutFileToCache,
    GetFileFromCache,

    WriteTable,
    ReadTable,

    StartOperation,
    GetOperation,

    StartTransaction,
    PingTransaction,
    AbortTransaction,
    CommitTransaction,

    AddMember,
    RemoveMember,

    Lock,
    Unlock,
}

/// The three orthogonal properties of a verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub has_input: bool,
    pub is_heavy: bool,
    pub is_volatile: bool,
}

impl Verb {
    pub const ALL: [Verb; 25] = [
        Verb::Create,
        Verb::Exists,
        Verb::Remove,
        Verb::Get,
        Verb::Set,
        Verb::List,
        Verb::Copy,
        Verb::Move,
        Verb::Link,
        Verb::WriteFile,
        Verb::ReadFile,
        Verb::PutFileToCache,
        Verb::GetFileFromCache,
        Verb::WriteTable,
        Verb::ReadTable,
        Verb::StartOperation,
        Verb::GetOperation,
        Verb::StartTransaction,
        Verb::PingTransaction,
        Verb::AbortTransaction,
        Verb::CommitTransaction,
        Verb::AddMember,
        Verb::RemoveMember,
        Verb::Lock,
        Verb::Unlock,
    ];

    /// Name used in the request path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Exists => "exists",
            Verb::Remove => "remove",
            Verb::Get => "get",
            Verb::Set => "set",
            Verb::List => "list",
            Verb::Copy => "copy",
            Verb::Move => "move",
            Verb::Link => "link",
            Verb::WriteFile => "write_file",
            Verb::ReadFile => "read_file",
            Verb::PutFileToCache => "put_file_to_cache",
            Verb::GetFileFromCache => "get_file_from_cache",
            Verb::WriteTable => "write_table",
            Verb::ReadTable => "read_table",
            Verb::StartOperation => "start_operation",
            Verb::GetOperation => "get_operation",
            Verb::StartTransaction => "start_transaction",
            Verb::PingTransaction => "ping_transaction",
            Verb::AbortTransaction => "abort_transaction",
            Verb::CommitTransaction => "commit_transaction",
            Verb::AddMember => "add_member",
            Verb::RemoveMember => "remove_member",
            Verb::Lock => "lock",
            Verb::Unlock => "unlock",
        }
    }

    /// Whether the request carries a body.
    pub fn has_input(&self) -> bool {
        match self {
            Verb::Set | Verb::WriteFile | Verb::WriteTable => true,
            Verb::Create
            | Verb::Exists
            | Verb::Remove
            | Verb::Get
            | Verb::List
            | Verb::Copy
            | Verb::Move
            | Verb::Link
            | Verb::ReadFile
            | Verb::PutFileToCache
            | Verb::GetFileFromCache
            | Verb::ReadTable
            | Verb::StartOperation
            | Verb::GetOperation
            | Verb::StartTransaction
            | Verb::PingTransaction
            | Verb::AbortTransaction
            | Verb::CommitTransaction
            | Verb::AddMember
            | Verb::RemoveMember
            | Verb::Lock
            | Verb::Unlock => false,
        }
    }

    /// Whether the verb moves bulk data and must go to a heavy proxy.
    pub fn is_heavy(&self) -> bool {
        match self {
            Verb::ReadFile | Verb::WriteFile | Verb::ReadTable | Verb::WriteTable => true,
            Verb::Create
            | Verb::Exists
            | Verb::Remove
            | Verb::Get
            | Verb::Set
            | Verb::List
            | Verb::Copy
            | Verb::Move
            | Verb::Link
            | Verb::PutFileToCache
            | Verb::GetFileFromCache
            | Verb::StartOperation
            | Verb::GetOperation
            | Verb::StartTransaction
            | Verb::PingTransaction
            | Verb::AbortTransaction
            | Verb::CommitTransaction
            | Verb::AddMember
            | Verb::RemoveMember
            | Verb::Lock
            | Verb::Unlock => false,
        }
    }

    /// Whether the verb mutates cluster state.
    pub fn is_volatile(&self) -> bool {
        match self {
            Verb::Get
            | Verb::List
            | Verb::Exists
            | Verb::ReadFile
            | Verb::ReadTable
            | Verb::GetOperation
            | Verb::GetFileFromCache => false,
            Verb::Create
            | Verb::Remove
            | Verb::Set
            | Verb::Copy
            | Verb::Move
            | Verb::Link
            | Verb::WriteFile
            | Verb::PutFileToCache
            | Verb::WriteTable
            | Verb::StartOperation
            | Verb::StartTransaction
            | Verb::PingTransaction
            | Verb::AbortTransaction
            | Verb::CommitTransaction
            | Verb::AddMember
            | Verb::RemoveMember
            | Verb::Lock
            | Verb::Unlock => true,
        }
    }

    pub fn classify(&self) -> Classification {
        Classification {
            has_input: self.has_input(),
            is_heavy: self.is_heavy(),
            is_volatile: self.is_volatile(),
        }
    }

    /// `PUT` for input-bearing verbs, `POST` for other mutations, `GET` otherwise.
    pub fn http_method(&self) -> Method {
        if self.has_input() {
            Method::PUT
        } else if self.is_volatile() {
            Method::POST
        } else {
            Method::GET
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .iter()
            .copied()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| Error::UnknownVerb(s.to_string()))
    }
}
