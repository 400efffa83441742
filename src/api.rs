//! Cypress node and file helpers.
//!
//! Thin typed wrappers that build a [`Call`] and pick the right executor.
//! Everything here can also be done with [`HttpClient::execute`] directly.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::call::Call;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::http::{HttpClient, ReadHandle, WriteHandle};
use crate::verb::Verb;
use crate::yson::{self, Yson};

/// Type of a Cypress node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    MapNode,
    File,
    Table,
    Document,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::MapNode => "map_node",
            NodeType::File => "file",
            NodeType::Table => "table",
            NodeType::Document => "document",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "map_node" => Ok(NodeType::MapNode),
            "file" => Ok(NodeType::File),
            "table" => Ok(NodeType::Table),
            "document" => Ok(NodeType::Document),
            other => Err(Error::InvalidParams(format!("unknown node type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateNodeOptions {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub recursive: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ignore_existing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RemoveNodeOptions {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub recursive: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

impl HttpClient {
    pub async fn get_node(&self, ctx: &Context, path: &str) -> Result<Yson> {
        let res = self.execute(ctx, Call::new(Verb::Get).with_param("path", path)).await?;
        Ok(res.decode()?.into_field("value"))
    }

    pub async fn set_node(&self, ctx: &Context, path: &str, value: &Yson) -> Result<()> {
        let call = Call::new(Verb::Set)
            .with_param("path", path)
            .with_payload(yson::to_string(value));
        self.execute(ctx, call).await.map(drop)
    }

    pub async fn node_exists(&self, ctx: &Context, path: &str) -> Result<bool> {
        let res = self.execute(ctx, Call::new(Verb::Exists).with_param("path", path)).await?;
        let value = res.decode()?.into_field("value");
        value
            .as_bool()
            .ok_or_else(|| Error::UnexpectedResponse(format!("exists returned {}", yson::to_string(&value))))
    }

    /// Names of the children of a map node.
    pub async fn list_node(&self, ctx: &Context, path: &str) -> Result<Vec<String>> {
        let res = self.execute(ctx, Call::new(Verb::List).with_param("path", path)).await?;
        let value = res.decode()?.into_field("value");
        let items = value
            .as_list()
            .ok_or_else(|| Error::UnexpectedResponse(format!("list returned {}", yson::to_string(&value))))?;

        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::UnexpectedResponse(format!("list item {}", yson::to_string(item)))
                })
            })
            .collect()
    }

    /// Create a node and return its id.
    pub async fn create_node(
        &self,
        ctx: &Context,
        path: &str,
        node_type: NodeType,
        options: &CreateNodeOptions,
    ) -> Result<Guid> {
        let call = Call::new(Verb::Create)
            .with_param("path", path)
            .with_param("type", node_type.as_str())
            .with_options(options)?;
        let res = self.execute(ctx, call).await?;

        match res.decode()?.into_field("node_id") {
            Yson::String(id) => Ok(id.parse()?),
            other => Err(Error::UnexpectedResponse(format!(
                "create returned {}",
                yson::to_string(&other)
            ))),
        }
    }

    pub async fn remove_node(&self, ctx: &Context, path: &str, options: &RemoveNodeOptions) -> Result<()> {
        let call = Call::new(Verb::Remove).with_param("path", path).with_options(options)?;
        self.execute(ctx, call).await.map(drop)
    }

    /// Stream the contents of a file node.
    pub async fn read_file(&self, ctx: &Context, path: &str) -> Result<ReadHandle> {
        self.open_read(ctx, Call::new(Verb::ReadFile).with_param("path", path))
            .await
    }

    /// Overwrite a file node with streamed content.
    pub async fn write_file(&self, ctx: &Context, path: &str) -> Result<WriteHandle> {
        self.open_write(ctx, Call::new(Verb::WriteFile).with_param("path", path))
            .await
    }
}
