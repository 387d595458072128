//! Custom-vision training client and the upload/train workflow built on it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::TrainingConfig;
use crate::error::{VisionError, VisionResult};
use crate::service::http;

pub const TRAINING_KEY_HEADER: &str = "Training-key";
const API_PATH: &str = "customvision/v3.3/training";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingTag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCreateResult {
    #[serde(default)]
    pub source_url: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCreateSummary {
    pub is_batch_successful: bool,
    #[serde(default)]
    pub images: Vec<ImageCreateResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iteration {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: String,
}

impl Iteration {
    pub fn is_completed(&self) -> bool {
        self.status == "Completed"
    }

    pub fn is_failed(&self) -> bool {
        self.status == "Failed"
    }
}

pub struct TrainingClient {
    http: Client,
    config: TrainingConfig,
}

impl TrainingClient {
    pub fn new(config: TrainingConfig) -> VisionResult<Self> {
        let http = http::build_client(config.timeout)?;
        Ok(Self { http, config })
    }

    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/projects/{}", self.config.endpoint, API_PATH, path)
    }

    pub async fn get_project(&self, project_id: &str) -> VisionResult<Project> {
        let request = self
            .http
            .get(self.url(project_id))
            .header(TRAINING_KEY_HEADER, &self.config.key);
        http::send_json(request).await
    }

    pub async fn get_tags(&self, project_id: &str) -> VisionResult<Vec<TrainingTag>> {
        let request = self
            .http
            .get(self.url(&format!("{project_id}/tags")))
            .header(TRAINING_KEY_HEADER, &self.config.key);
        http::send_json(request).await
    }

    pub async fn create_images_from_data(
        &self,
        project_id: &str,
        file_name: &str,
        image: Vec<u8>,
        tag_ids: &[&str],
    ) -> VisionResult<ImageCreateSummary> {
        let form = Form::new().part("imageData", Part::bytes(image).file_name(file_name.to_string()));
        let request = self
            .http
            .post(self.url(&format!("{project_id}/images")))
            .query(&[("tagIds", tag_ids.join(","))])
            .header(TRAINING_KEY_HEADER, &self.config.key)
            .multipart(form);
        http::send_json(request).await
    }

    pub async fn train_project(&self, project_id: &str) -> VisionResult<Iteration> {
        let request = self
            .http
            .post(self.url(&format!("{project_id}/train")))
            .header(TRAINING_KEY_HEADER, &self.config.key);
        http::send_json(request).await
    }

    pub async fn get_iteration(&self, project_id: &str, iteration_id: &str) -> VisionResult<Iteration> {
        let request = self
            .http
            .get(self.url(&format!("{project_id}/iterations/{iteration_id}")))
            .header(TRAINING_KEY_HEADER, &self.config.key);
        http::send_json(request).await
    }
}

/// A client bound to the project it operates on.
pub struct TrainingSession {
    pub client: TrainingClient,
    pub project: Project,
}

impl TrainingSession {
    /// Resolve the configured project.
    pub async fn open(client: TrainingClient) -> VisionResult<Self> {
        let project = client.get_project(client.project_id()).await?;
        info!(project = %project.name, "Opened custom vision project");
        Ok(Self { client, project })
    }

    /// Upload every file under `folder/<tag name>/`, tagged with that tag.
    /// Returns the number of images uploaded.
    pub async fn upload_images(&self, folder: &Path) -> VisionResult<usize> {
        println!("Uploading images...");
        let tags = self.client.get_tags(&self.project.id).await?;
        let mut uploaded = 0;

        for tag in &tags {
            println!("{}", tag.name);
            let dir = folder.join(&tag.name);
            if !dir.is_dir() {
                return Err(VisionError::NotFound(dir));
            }

            for path in image_files(&dir)? {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let data = tokio::fs::read(&path).await?;
                debug!("Uploading {} ({} bytes)", path.display(), data.len());

                let summary = self
                    .client
                    .create_images_from_data(&self.project.id, &file_name, data, &[tag.id.as_str()])
                    .await?;
                if !summary.is_batch_successful {
                    let statuses: Vec<_> = summary.images.iter().map(|i| i.status.as_str()).collect();
                    warn!("Upload of {} not fully successful: {:?}", path.display(), statuses);
                }
                uploaded += 1;
            }
        }

        Ok(uploaded)
    }

    /// Start training and poll until the iteration completes.
    pub async fn train_model(&self, poll_interval: Duration) -> VisionResult<Iteration> {
        println!("Training ...");
        let mut iteration = self.client.train_project(&self.project.id).await?;

        while !iteration.is_completed() {
            if iteration.is_failed() {
                return Err(VisionError::RemoteOperation(format!(
                    "training iteration {} failed",
                    iteration.id
                )));
            }
            tokio::time::sleep(poll_interval).await;
            iteration = self
                .client
                .get_iteration(&self.project.id, &iteration.id)
                .await?;
            println!("{} ...", iteration.status);
        }

        println!("Model trained!");
        Ok(iteration)
    }
}

/// Regular files in `dir`, sorted by name.
fn image_files(dir: &Path) -> VisionResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_files_sorted_and_skip_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"b").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let names: Vec<_> = image_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_iteration_status() {
        let it: Iteration = serde_json::from_str(r#"{"id":"i1","status":"Completed"}"#).unwrap();
        assert!(it.is_completed());
        let it: Iteration = serde_json::from_str(r#"{"id":"i1","status":"Training"}"#).unwrap();
        assert!(!it.is_completed() && !it.is_failed());
    }
}
