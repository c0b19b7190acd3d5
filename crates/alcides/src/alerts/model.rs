use serde::{
    de::{self, IgnoredAny, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use std::{collections::HashMap, fmt};

use crate::rundeck::JobTrigger;

/// Label naming the Rundeck job an alert should run.
pub const JOB_ID_LABEL: &str = "rundeck_job_id";
/// Annotation carrying the job's argument string.
pub const JOB_ARGS_ANNOTATION: &str = "rundeck_args";

// Alertmanager webhook payload. A JSON null anywhere decodes as the empty value.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertBatch {
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(rename = "groupKey", deserialize_with = "null_as_default")]
    pub group_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub receiver: String,
    #[serde(rename = "groupLabels", deserialize_with = "string_map")]
    pub group_labels: HashMap<String, String>,
    #[serde(rename = "commonLabels", deserialize_with = "string_map")]
    pub common_labels: HashMap<String, String>,
    #[serde(rename = "commonAnnotations", deserialize_with = "string_map")]
    pub common_annotations: HashMap<String, String>,
    #[serde(rename = "externalURL", deserialize_with = "null_as_default")]
    pub external_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alerts: Vec<Alert>,
}

/// One alert. Keys are matched case-insensitively and the last occurrence
/// wins, so `endsAt` and `EndsAt` name the same field.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Alert {
    pub labels: HashMap<String, String>,
    pub annotations: HashMap<String, String>,
    #[serde(rename = "startsAt", skip_serializing_if = "String::is_empty")]
    pub starts_at: String,
    #[serde(rename = "EndsAt", skip_serializing_if = "String::is_empty")]
    pub ends_at: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: Option<HashMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(map
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, v.unwrap_or_default()))
        .collect())
}

struct StringMap(HashMap<String, String>);

impl<'de> Deserialize<'de> for StringMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        string_map(deserializer).map(StringMap)
    }
}

impl<'de> Deserialize<'de> for Alert {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AlertVisitor;

        impl<'de> Visitor<'de> for AlertVisitor {
            type Value = Alert;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an alertmanager alert object")
            }

            fn visit_unit<E>(self) -> Result<Alert, E>
            where
                E: de::Error,
            {
                Ok(Alert::default())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Alert, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut alert = Alert::default();
                while let Some(key) = map.next_key::<String>()? {
                    if key.eq_ignore_ascii_case("labels") {
                        alert.labels = map.next_value::<StringMap>()?.0;
                    } else if key.eq_ignore_ascii_case("annotations") {
                        alert.annotations = map.next_value::<StringMap>()?.0;
                    } else if key.eq_ignore_ascii_case("startsAt") {
                        alert.starts_at = map.next_value::<Option<String>>()?.unwrap_or_default();
                    } else if key.eq_ignore_ascii_case("endsAt") {
                        alert.ends_at = map.next_value::<Option<String>>()?.unwrap_or_default();
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(alert)
            }
        }

        deserializer.deserialize_any(AlertVisitor)
    }
}

impl Alert {
    /// The job this alert asks for, if it carries a job id label.
    pub fn job_trigger(&self) -> Option<JobTrigger> {
        let job_id = self.labels.get(JOB_ID_LABEL)?;
        Some(JobTrigger {
            job_id: job_id.clone(),
            args: self.annotations.get(JOB_ARGS_ANNOTATION).cloned(),
        })
    }
}
