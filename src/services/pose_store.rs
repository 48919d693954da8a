use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::error::{PoseDataError, TrainingError};
use crate::models::PoseReference;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Listing entry for one stored pose
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoseInfo {
    pub pose_id: String,
    pub display_name: String,
    pub image_file: Option<PathBuf>,
}

impl PoseInfo {
    pub fn new(pose_id: impl Into<String>, image_file: Option<PathBuf>) -> Self {
        let pose_id = pose_id.into();
        Self {
            display_name: display_name(&pose_id),
            pose_id,
            image_file,
        }
    }
}

/// Source of reference poses, passed explicitly to whoever needs it
#[cfg_attr(test, mockall::automock)]
pub trait PoseStore {
    fn all_pose_infos(&self) -> Result<Vec<PoseInfo>, PoseDataError>;

    /// Raw bytes of the illustration, if the pose has one
    fn load_pose_image(&self, info: &PoseInfo) -> Option<Vec<u8>>;

    fn all_poses(&self) -> Result<Vec<PoseReference>, PoseDataError>;

    fn add_pose(&self, pose: &PoseReference, image: Option<Vec<u8>>) -> Result<PoseInfo, PoseDataError>;
}

/// Resolve an ordered training list. Fails on the first missing id.
pub fn load_sequence(
    store: &dyn PoseStore,
    pose_ids: &[String],
) -> Result<Vec<PoseReference>, TrainingError> {
    if pose_ids.is_empty() {
        return Err(TrainingError::EmptyTrainingList);
    }

    let available = store.all_poses()?;
    pose_ids
        .iter()
        .map(|id| {
            available
                .iter()
                .find(|pose| &pose.pose_id == id)
                .cloned()
                .ok_or_else(|| TrainingError::from(PoseDataError::NotFound(id.clone())))
        })
        .collect()
}

/// "jurus1_pose1" -> "Jurus1 Pose1"
pub fn display_name(pose_id: &str) -> String {
    pose_id
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// One `<poseId>.json` per pose, with an optional sibling image
pub struct FilePoseStore {
    dir: PathBuf,
    cache: RwLock<Option<Vec<PoseReference>>>,
}

impl FilePoseStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(None),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn pose_files(&self) -> Result<Vec<PathBuf>, PoseDataError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Pose directory {} does not exist", self.dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn image_for(&self, pose_id: &str) -> Option<PathBuf> {
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", pose_id, ext)))
            .find(|path| path.is_file())
    }

    /// Parse every pose file. A file must be named after the id it declares,
    /// which also keeps ids unique within the directory.
    fn read_all(&self) -> Result<Vec<PoseReference>, PoseDataError> {
        let mut poses = Vec::new();
        for path in self.pose_files()? {
            let bytes = fs::read(&path)?;
            let pose = PoseReference::from_json_slice(&bytes)?;

            if path.file_stem().and_then(|s| s.to_str()) != Some(pose.pose_id.as_str()) {
                tracing::warn!(
                    "Pose file {} declares id '{}'",
                    path.display(),
                    pose.pose_id
                );
                return Err(PoseDataError::FileIdMismatch {
                    file: path,
                    pose_id: pose.pose_id,
                });
            }
            poses.push(pose);
        }

        tracing::debug!("Loaded {} poses from {}", poses.len(), self.dir.display());
        Ok(poses)
    }
}

impl PoseStore for FilePoseStore {
    fn all_pose_infos(&self) -> Result<Vec<PoseInfo>, PoseDataError> {
        Ok(self
            .all_poses()?
            .iter()
            .map(|pose| PoseInfo::new(pose.pose_id.clone(), self.image_for(&pose.pose_id)))
            .collect())
    }

    fn load_pose_image(&self, info: &PoseInfo) -> Option<Vec<u8>> {
        let path = info.image_file.as_ref()?;
        match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!("Failed to read pose image {}: {}", path.display(), e);
                None
            }
        }
    }

    fn all_poses(&self) -> Result<Vec<PoseReference>, PoseDataError> {
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(cached.clone());
        }

        let poses = self.read_all()?;
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(poses.clone());
        Ok(poses)
    }

    fn add_pose(&self, pose: &PoseReference, image: Option<Vec<u8>>) -> Result<PoseInfo, PoseDataError> {
        pose.validate()?;
        if pose.pose_id.contains(['/', '\\']) || pose.pose_id.starts_with('.') {
            return Err(PoseDataError::InvalidPoseId(pose.pose_id.clone()));
        }

        fs::create_dir_all(&self.dir)?;
        fs::write(
            self.dir.join(format!("{}.json", pose.pose_id)),
            pose.to_json_string()?,
        )?;

        if let Some(bytes) = image {
            fs::write(self.dir.join(format!("{}.png", pose.pose_id)), bytes)?;
        }

        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
        tracing::info!("Added pose '{}' to {}", pose.pose_id, self.dir.display());

        Ok(PoseInfo::new(pose.pose_id.clone(), self.image_for(&pose.pose_id)))
    }
}
