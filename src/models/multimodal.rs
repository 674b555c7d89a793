//! 多模态输入的数据结构
//!
//! 由 PDF 提取协作方产出，对本系统来说是不透明的输入：
//! 一段上下文文本配上一张或多张相关图片

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

/// 从 PDF 中提取出的一张图片
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedImage {
    /// 原始图片字节
    pub image_data: Vec<u8>,
    /// 页码（从 1 开始）
    pub page_number: usize,
    /// 同页内的图片序号（从 0 开始）
    #[serde(default)]
    pub image_index: usize,
    /// 图片格式（png、jpeg 等）
    #[serde(default = "default_format")]
    pub format: String,
    /// 图注（如果提取到了）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

fn default_format() -> String {
    "png".to_string()
}

impl ExtractedImage {
    /// 编码为 base64，供模型 API 调用使用
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.image_data)
    }

    pub fn size(&self) -> usize {
        self.image_data.len()
    }
}

impl std::fmt::Display for ExtractedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Image(page={}, idx={}, {} bytes)",
            self.page_number,
            self.image_index,
            self.size()
        )
    }
}

/// 上下文文本 + 相关图片的配对
///
/// 代表一个逻辑单元（比如一张图和它的说明文字），
/// 多模态生成以它为输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextImagePair {
    /// 上下文文本（图注 + 附近段落）
    pub text: String,
    pub images: Vec<ExtractedImage>,
    /// 来源页码
    pub page_number: usize,
    /// 来源 PDF 文件名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_pdf: Option<String>,
}

impl TextImagePair {
    /// 所有图片的 base64 编码列表
    pub fn image_base64_list(&self) -> Vec<String> {
        self.images.iter().map(|img| img.to_base64()).collect()
    }

    pub fn total_image_size(&self) -> usize {
        self.images.iter().map(|img| img.size()).sum()
    }
}

impl std::fmt::Display for TextImagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TextImagePair(page={}, text={} chars, images={})",
            self.page_number,
            self.text.chars().count(),
            self.images.len()
        )
    }
}
