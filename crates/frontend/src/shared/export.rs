/// Экспорт таблиц дашбордов в CSV с загрузкой через браузер
use chrono::Utc;
use contracts::dashboards::d402_receipt_analytics::{export_filename, render_csv, ExportError};
use serde::Serialize;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Рендерит записи в CSV и инициирует скачивание файла `<base>-<timestamp>.csv`.
///
/// Пустой набор данных - `ExportError::NothingToExport`, файл не создаётся.
pub fn export_to_csv<T: Serialize>(data: &[T], base: &str) -> Result<(), ExportError> {
    let content = render_csv(data)?;
    let filename = export_filename(base, Utc::now());

    let blob = create_csv_blob(&content).map_err(ExportError::Download)?;
    download_blob(&blob, &filename).map_err(ExportError::Download)?;

    log::info!("Exported {} rows to {}", data.len(), filename);
    Ok(())
}

fn create_csv_blob(content: &str) -> Result<Blob, String> {
    let array = js_sys::Array::new();
    array.push(&wasm_bindgen::JsValue::from_str(content));

    let properties = BlobPropertyBag::new();
    properties.set_type("text/csv;charset=utf-8;");

    Blob::new_with_str_sequence_and_options(&array, &properties)
        .map_err(|e| format!("Failed to create blob: {:?}", e))
}

/// Временная ссылка: добавить в DOM, кликнуть, удалить
fn download_blob(blob: &Blob, filename: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document object")?;
    let body = document.body().ok_or("No body element")?;

    let url = Url::create_object_url_with_blob(blob)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))?;

    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Failed to create anchor: {:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|e| format!("Failed to cast to anchor: {:?}", e))?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor
        .style()
        .set_property("display", "none")
        .map_err(|e| format!("Failed to set style: {:?}", e))?;

    body.append_child(&anchor)
        .map_err(|e| format!("Failed to append anchor: {:?}", e))?;
    anchor.click();
    body.remove_child(&anchor)
        .map_err(|e| format!("Failed to remove anchor: {:?}", e))?;

    Url::revoke_object_url(&url).map_err(|e| format!("Failed to revoke URL: {:?}", e))?;

    Ok(())
}
