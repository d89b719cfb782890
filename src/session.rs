use google_api_proto::google::spanner::v1 as proto;

/// A Cloud Spanner session, the context in which transactions are executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session(String);

impl Session {
    /// Wraps an existing session's fully qualified name.
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<proto::Session> for Session {
    fn from(value: proto::Session) -> Self {
        Self(value.name)
    }
}

/// Identifies a database as `projects/{project}/instances/{instance}/databases/{database}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseId {
    project: String,
    instance: String,
    database: String,
}

impl DatabaseId {
    pub fn new(project: &str, instance: &str, database: &str) -> Self {
        Self {
            project: project.to_string(),
            instance: instance.to_string(),
            database: database.to_string(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn instance_path(&self) -> String {
        format!("projects/{}/instances/{}", self.project, self.instance)
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn path(&self) -> String {
        format!("{}/databases/{}", self.instance_path(), self.database)
    }
}
