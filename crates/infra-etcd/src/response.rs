// etcd v2 response bodies

use envetcd_core::domain::RawEntry;
use serde::Deserialize;

/// etcd error code for a missing key
pub const ERROR_CODE_KEY_NOT_FOUND: u64 = 100;

/// `GET /v2/keys/...` success body
#[derive(Debug, Deserialize)]
pub struct KeysResponse {
    pub node: Node,
}

/// One node of the key tree
#[derive(Debug, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub dir: bool,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Node {
    /// Depth-first flatten into raw entries, the node itself first
    pub fn flatten(self) -> Vec<RawEntry> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<RawEntry>) {
        if self.dir {
            out.push(RawEntry::directory(self.key));
        } else {
            out.push(RawEntry::value(self.key, self.value.unwrap_or_default()));
        }
        for child in self.nodes {
            child.flatten_into(out);
        }
    }
}

/// etcd error body (`{"errorCode":100,"message":"Key not found",...}`)
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "errorCode")]
    pub error_code: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub cause: String,
}

/// `GET /v2/members` body
#[derive(Debug, Deserialize)]
pub struct MembersResponse {
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "clientURLs", default)]
    pub client_urls: Vec<String>,
}
