use std::fmt;

use crate::location::LocationError;
use crate::media::CameraError;

/// A one-off message for the user that is not part of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    CameraPermissionDenied,
    CameraNotFound,
    CameraFailed,
    CameraNotReady,
    LocationDenied,
    LocationUnavailable,
    NoImageFiles,
    PhotoUnreadable(String),
}

impl From<&CameraError> for Notice {
    fn from(err: &CameraError) -> Self {
        match err {
            CameraError::PermissionDenied => Notice::CameraPermissionDenied,
            CameraError::NotFound => Notice::CameraNotFound,
            CameraError::Other(_) => Notice::CameraFailed,
        }
    }
}

impl From<&LocationError> for Notice {
    fn from(err: &LocationError) -> Self {
        match err {
            LocationError::PermissionDenied => Notice::LocationDenied,
            _ => Notice::LocationUnavailable,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::CameraPermissionDenied =>
                write!(f, "需要摄像头权限才能看见你眼前的世界，请允许访问摄像头。"),
            Notice::CameraNotFound => write!(f, "没有找到摄像头，你也可以上传一张照片。"),
            Notice::CameraFailed => write!(f, "摄像头暂时无法启动，你也可以上传一张照片。"),
            Notice::CameraNotReady => write!(f, "摄像头还没有准备好。"),
            Notice::LocationDenied => write!(f, "没有获得位置权限，我将无法感受你所在的天地。"),
            Notice::LocationUnavailable => write!(f, "暂时无法获取你的位置。"),
            Notice::NoImageFiles => write!(f, "请选择图片文件。"),
            Notice::PhotoUnreadable(name) => write!(f, "无法读取图片 {}。", name),
        }
    }
}
