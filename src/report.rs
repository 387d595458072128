//! Console summaries of remote results.

use crate::annotate::PEOPLE_CONFIDENCE_THRESHOLD;
use crate::service::analysis::{AnalysisResult, ReadResult};
use crate::service::face::DetectedFace;

fn percent(confidence: f32) -> String {
    format!("{:.2}%", confidence * 100.0)
}

pub fn faces(faces: &[DetectedFace]) -> String {
    let mut out = String::new();
    if faces.is_empty() {
        out.push_str("No faces detected.\n");
        return out;
    }

    out.push_str(&format!("{} faces detected.\n", faces.len()));
    for (i, face) in faces.iter().enumerate() {
        out.push_str(&format!("\nFace number {}\n", i + 1));
        let Some(attrs) = &face.face_attributes else {
            continue;
        };
        if let Some(pose) = &attrs.head_pose {
            out.push_str(&format!(" - Head Pose (Yaw): {}\n", pose.yaw));
            out.push_str(&format!(" - Head Pose (Pitch): {}\n", pose.pitch));
            out.push_str(&format!(" - Head Pose (Roll): {}\n", pose.roll));
        }
        if let Some(occlusion) = &attrs.occlusion {
            out.push_str(&format!(" - Forehead occluded?: {}\n", occlusion.forehead_occluded));
            out.push_str(&format!(" - Eye occluded?: {}\n", occlusion.eye_occluded));
            out.push_str(&format!(" - Mouth occluded?: {}\n", occlusion.mouth_occluded));
        }
        if !attrs.accessories.is_empty() {
            out.push_str(" - Accessories:\n");
            for accessory in &attrs.accessories {
                out.push_str(&format!("   - {}\n", accessory.kind));
            }
        }
    }
    out
}

/// Caption and dense captions.
pub fn captions(result: &AnalysisResult) -> String {
    let mut out = String::new();
    if let Some(caption) = &result.caption_result {
        out.push_str("\nCaption:\n");
        out.push_str(&format!(
            " Caption: '{}' (confidence: {})\n",
            caption.text,
            percent(caption.confidence),
        ));
    }
    if let Some(dense) = &result.dense_captions_result {
        out.push_str("\nDense Captions:\n");
        for caption in &dense.values {
            out.push_str(&format!(
                " Caption: '{}' (confidence: {})\n",
                caption.text,
                percent(caption.confidence),
            ));
        }
    }
    out
}

pub fn text_lines(read: &ReadResult) -> String {
    let mut out = String::from("\nText:\n");
    for line in read.lines() {
        out.push_str(&format!(" {}\n", line.text));
    }
    out
}

pub fn words(read: &ReadResult) -> String {
    let mut out = String::from("\nIndividual words:\n");
    for word in read.words() {
        out.push_str(&format!("  {} (Confidence: {})\n", word.text, percent(word.confidence)));
    }
    out
}

/// Tags and objects.
pub fn tags_and_objects(result: &AnalysisResult) -> String {
    let mut out = String::new();
    if let Some(tags) = &result.tags_result {
        out.push_str("\nTags:\n");
        for tag in &tags.values {
            out.push_str(&format!(
                " Tag: '{}' (confidence: {})\n",
                tag.name,
                percent(tag.confidence),
            ));
        }
    }
    if let Some(objects) = &result.objects_result {
        out.push_str("\nObjects in image:\n");
        for object in &objects.values {
            if let Some(tag) = object.tags.first() {
                out.push_str(&format!(" {} (confidence: {})\n", tag.name, percent(tag.confidence)));
            }
        }
    }
    out
}

/// People above the drawing threshold.
pub fn people(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let Some(people) = result.people_result.as_ref().filter(|p| !p.values.is_empty()) else {
        return out;
    };

    out.push_str("\nPeople in image:\n");
    for person in people
        .values
        .iter()
        .filter(|p| p.confidence > PEOPLE_CONFIDENCE_THRESHOLD)
    {
        out.push_str(&format!(
            " {} (confidence: {})\n",
            person.bounding_box,
            percent(person.confidence),
        ));
    }
    out
}
