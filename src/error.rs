use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrshadError {
    #[error("خطأ في الإعدادات: {0}")]
    Config(String),

    #[error("عنوان التقرير مطلوب")]
    MissingTitle,

    #[error("بيانات غير صالحة: {0}")]
    Validation(String),

    #[error("الملف غير موجود: {0}")]
    FileNotFound(String),

    #[error("المجلد غير موجود: {0}")]
    FolderNotFound(String),

    #[error("تعذر تحميل الصورة: {0}")]
    Asset(String),

    #[error("خطأ في الخط: {0}")]
    Font(String),

    #[error("فشل التقاط الصفحة: {0}")]
    Capture(String),

    #[error("لا يوجد محتوى قابل للتصدير")]
    EmptyContent,

    #[error("خطأ في إنشاء PDF: {0}")]
    PdfGeneration(String),

    #[error("خطأ في التخزين: {0}")]
    Storage(String),

    #[error("التقرير غير موجود: {0}")]
    ReportNotFound(String),

    #[error("خطأ في الإدخال التفاعلي: {0}")]
    Prompt(String),

    #[error("خطأ في قراءة JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("خطأ في الإدخال/الإخراج: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] irshad_common::Error),
}

pub type Result<T> = std::result::Result<T, IrshadError>;
