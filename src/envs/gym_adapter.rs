use crate::error::{MdpError, Result};
use crate::mdps::mdp::{Transition, TransitionModel};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::ser::Serialize;
use serde_json::{json, Map, Value};
use tracing::info;

/// Reads the transition model of a discrete environment from a gymnasium-http-api server.
/// NOTE: All APIs are sync as the server is expected to be local.
#[derive(Debug)]
pub struct GymAdapter {
    client: reqwest::blocking::Client,
    env_api_url: String,
    instance_id: String,
}

impl GymAdapter {
    /// Creates a new environment instance on the server.
    pub fn new(base_url: &str, env_id: &str, kwargs: &[(&str, Value)]) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().build()?;
        let api_url = make_api_url(base_url);
        let kwargs = kwargs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<Map<_, _>>();
        let obj = http_post(
            &client,
            &api_url,
            &json!({ "env_id": env_id, "kwargs": kwargs }),
        )?;
        let instance_id = obj["instance_id"]
            .as_str()
            .ok_or_else(|| MdpError::GymProtocol("no instance_id returned".to_string()))?;
        info!(env_id, instance_id, "created gym environment");

        Ok(Self::with_client(client, base_url, instance_id))
    }

    /// Refers to an environment instance that already exists on the server.
    pub fn reference(base_url: &str, instance_id: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self::with_client(client, base_url, instance_id))
    }

    fn with_client(client: reqwest::blocking::Client, base_url: &str, instance_id: &str) -> Self {
        Self {
            env_api_url: format!("{}{instance_id}/", make_api_url(base_url)),
            client,
            instance_id: instance_id.to_string(),
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn n_s(&self) -> Result<usize> {
        let obj = http_get(&self.client, &format!("{}observation_space/", self.env_api_url))?;
        discrete_n(&obj["info"])
    }

    pub fn n_a(&self) -> Result<usize> {
        let obj = http_get(&self.client, &format!("{}action_space/", self.env_api_url))?;
        discrete_n(&obj["info"])
    }

    pub fn transition_model(&self, gamma: f64) -> Result<TransitionModel> {
        let (n_s, n_a) = (self.n_s()?, self.n_a()?);
        let obj = http_get(&self.client, &format!("{}transitions/", self.env_api_url))?;

        transitions_from_json(&obj["transitions"], n_s, n_a, gamma)
    }
}

/// Size of a `Discrete` space description (`{"name": "Discrete", "n": 16}`).
pub fn discrete_n(info: &Value) -> Result<usize> {
    match (info["name"].as_str(), info["n"].as_u64()) {
        (Some("Discrete"), Some(n)) => Ok(n as usize),
        _ => Err(MdpError::GymProtocol(format!(
            "'{info}' is not a Discrete space"
        ))),
    }
}

/// Builds a model from the server's `{"<s>": {"<a>": [[p, s', r, done], ..]}}` layout.
pub fn transitions_from_json(
    obj: &Value,
    n_s: usize,
    n_a: usize,
    gamma: f64,
) -> Result<TransitionModel> {
    let table = (0..n_s)
        .map(|s| {
            let s_trans = obj[&s.to_string()].as_object().ok_or_else(|| {
                MdpError::GymProtocol(format!("no transitions for state {s}"))
            })?;
            (0..n_a)
                .map(|a| -> Result<Vec<Transition>> {
                    match s_trans.get(&a.to_string()) {
                        Some(ts) => Ok(serde_json::from_value(ts.clone())?),
                        None => Ok(vec![]),
                    }
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    TransitionModel::from_table(gamma, table)
}

fn make_api_url(base_url: &str) -> String {
    let base_url = base_url
        .trim_end_matches('/')
        .replace("//localhost:", "//127.0.0.1:");
    format!("{base_url}/v1/envs/")
}

fn http_get(client: &reqwest::blocking::Client, url: &str) -> Result<Value> {
    let res = client
        .get(url)
        .headers(construct_common_headers())
        .send()?
        .error_for_status()?;
    Ok(res.json::<Value>()?)
}

fn http_post<T: Serialize>(client: &reqwest::blocking::Client, url: &str, body: &T) -> Result<Value> {
    let res = client
        .post(url)
        .headers(construct_common_headers())
        .json(body)
        .send()?
        .error_for_status()?;
    Ok(res.json::<Value>()?)
}

fn construct_common_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}
