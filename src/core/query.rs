use crate::domain::model::{Pair, RequestDescriptor};

pub const DEFAULT_ENDPOINT: &str = "https://transit.yahoo.co.jp/search/result";

// Fixed search-mode parameters; the site expects every one of them.
const QUERY_MID: &str = "&flatlon=&to=";
const QUERY_TAIL: &str = "&viacode=&viacode=&viacode=&shin=&ex=&hb=&al=&lb=&sr=\
&type=1&ws=3&s=&ei=&fl=1&tl=3&expkind=1&ticket=ic&mtf=1&userpass=0\
&detour_id=&fromgid=&togid=&kw=";

/// Maps a pair to its route search URL. Pure: no I/O, no state beyond the endpoint.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    endpoint: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl QueryBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn url_for(&self, pair: &Pair) -> String {
        let origin = urlencoding::encode(&pair.actor.address);
        let destination = urlencoding::encode(&pair.location.address);

        let mut url = String::with_capacity(
            self.endpoint.len() + QUERY_MID.len() + QUERY_TAIL.len() + 16 + origin.len()
                + destination.len() * 2,
        );
        url.push_str(&self.endpoint);
        url.push_str("?from=");
        url.push_str(&origin);
        url.push_str(QUERY_MID);
        url.push_str(&destination);
        url.push_str(QUERY_TAIL);
        url.push_str(&destination);
        url
    }

    pub fn build(&self, pair: Pair) -> RequestDescriptor {
        RequestDescriptor {
            url: self.url_for(&pair),
            pair,
        }
    }

    pub fn build_all(&self, pairs: Vec<Pair>) -> Vec<RequestDescriptor> {
        pairs.into_iter().map(|pair| self.build(pair)).collect()
    }
}
