use crate::shared::config::StockFeedSettings;
use anyhow::{Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use contracts::domain::a001_watch_remnant::{FeedColumns, FeedRow, WatchRemnant};
use std::io::{Cursor, Read};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("archive does not contain {0}")]
    MissingEntry(String),

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error("header row {0} is empty or outside the sheet")]
    MissingHeader(u32),

    #[error("header row has no column {0:?}")]
    MissingColumn(String),

    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Лист выгрузки: заголовок и строки под ним
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSheet {
    pub header: Vec<String>,
    pub rows: Vec<FeedRow>,
}

/// Загрузчик файла остатков поставщика
pub struct StockFeedClient {
    client: reqwest::Client,
    settings: StockFeedSettings,
}

impl StockFeedClient {
    pub fn new(settings: StockFeedSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, settings })
    }

    /// Скачать архив, прочитать таблицу и собрать остатки
    pub async fn download_stock(&self) -> Result<Vec<WatchRemnant>> {
        tracing::info!("Downloading stock feed from {}", self.settings.url);

        let response = self
            .client
            .get(&self.settings.url)
            .send()
            .await
            .context("Stock feed request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Stock feed download failed with status {}", status);
        }

        let archive = response
            .bytes()
            .await
            .context("Failed to read stock feed body")?;
        tracing::debug!("Stock feed archive: {} bytes", archive.len());

        let workbook = extract_entry(&archive, &self.settings.file_name)?;
        let range = first_worksheet(workbook)?;
        let sheet = read_sheet(&range, self.settings.header_row)?;
        let remnants = to_remnants(&sheet, &self.settings.columns())?;

        tracing::info!(
            "Stock feed parsed: {} rows, {} remnants",
            sheet.rows.len(),
            remnants.len()
        );
        Ok(remnants)
    }
}

/// Достать файл из zip-архива в память.
///
/// Сначала ищется точное имя, затем запись, оканчивающаяся на это имя
/// без учёта регистра (архивы иногда содержат каталог).
pub fn extract_entry(archive: &[u8], file_name: &str) -> Result<Vec<u8>, FeedError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;

    let wanted = file_name.to_lowercase();
    let entry_name = zip
        .file_names()
        .find(|name| *name == file_name)
        .or_else(|| {
            zip.file_names()
                .find(|name| name.to_lowercase().ends_with(&wanted))
        })
        .map(str::to_string)
        .ok_or_else(|| FeedError::MissingEntry(file_name.to_string()))?;

    let mut entry = zip.by_name(&entry_name)?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Открыть книгу (xls или xlsx) и вернуть первый лист
pub fn first_worksheet(workbook: Vec<u8>) -> Result<Range<Data>, FeedError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(workbook))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(FeedError::NoWorksheet)??;
    Ok(range)
}

/// Прочитать лист начиная со строки заголовка `header_row` (абсолютный номер с нуля).
/// Полностью пустые строки пропускаются.
pub fn read_sheet(range: &Range<Data>, header_row: u32) -> Result<FeedSheet, FeedError> {
    let (start_row, _) = range.start().ok_or(FeedError::MissingHeader(header_row))?;
    if header_row < start_row {
        return Err(FeedError::MissingHeader(header_row));
    }

    let mut rows = range.rows().skip((header_row - start_row) as usize);
    let header: Vec<String> = rows
        .next()
        .ok_or(FeedError::MissingHeader(header_row))?
        .iter()
        .map(cell_text)
        .collect();
    if header.iter().all(String::is_empty) {
        return Err(FeedError::MissingHeader(header_row));
    }

    let rows = rows
        .filter(|row| row.iter().any(|cell| !cell_text(cell).is_empty()))
        .map(|row| {
            header
                .iter()
                .zip(row.iter())
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, cell)| (name.clone(), cell_text(cell)))
                .collect::<FeedRow>()
        })
        .collect();

    Ok(FeedSheet { header, rows })
}

/// Собрать остатки из строк листа
pub fn to_remnants(sheet: &FeedSheet, columns: &FeedColumns) -> Result<Vec<WatchRemnant>, FeedError> {
    for column in [&columns.code, &columns.quantity, &columns.price] {
        if !sheet.header.contains(column) {
            return Err(FeedError::MissingColumn(column.clone()));
        }
    }

    Ok(sheet
        .rows
        .iter()
        .filter_map(|row| WatchRemnant::from_row(row, columns))
        .collect())
}

/// Текст ячейки. Целые числа с плавающей точкой пишутся без дробной части,
/// чтобы код `73921.0` совпадал с артикулом `73921`.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use zip::write::SimpleFileOptions;

    fn archive_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Лист как у поставщика: шапка-заголовок сверху, таблица ниже
    fn feed_range() -> Range<Data> {
        let mut range = Range::new((1, 0), (6, 3));
        range.set_value((1, 0), Data::String("Остатки на складе".into()));
        for (col, name) in ["Код", "Наименование", "Количество", "Цена"].iter().enumerate() {
            range.set_value((3, col as u32), Data::String(name.to_string()));
        }
        range.set_value((4, 0), Data::Float(73921.0));
        range.set_value((4, 1), Data::String(" Casio MTP-1302 ".into()));
        range.set_value((4, 2), Data::String(">10".into()));
        range.set_value((4, 3), Data::String("5'990.00 руб.".into()));
        // строка 5 пустая
        range.set_value((6, 0), Data::String("A-17".into()));
        range.set_value((6, 2), Data::Float(3.0));
        range.set_value((6, 3), Data::Float(12990.5));
        range
    }

    const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

    /// Минимальная книга xlsx: заголовок листа в A1, таблица с 18-й строки
    fn feed_xlsx() -> Vec<u8> {
        let strings = [
            "Остатки на складе",
            "Код",
            "Наименование",
            "Количество",
            "Цена",
            "Casio MTP-1302",
            "&gt;10",
            "5'990.00 руб.",
            "A-17",
        ];
        let shared_strings = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="{}" count="{n}" uniqueCount="{n}">{}</sst>"#,
            MAIN_NS,
            strings
                .iter()
                .map(|s| format!("<si><t>{}</t></si>", s))
                .collect::<String>(),
            n = strings.len()
        );
        let sheet = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{}"><sheetData>"#,
                r#"<row r="1"><c r="A1" t="s"><v>0</v></c></row>"#,
                r#"<row r="18"><c r="A18" t="s"><v>1</v></c><c r="B18" t="s"><v>2</v></c>"#,
                r#"<c r="C18" t="s"><v>3</v></c><c r="D18" t="s"><v>4</v></c></row>"#,
                r#"<row r="19"><c r="A19"><v>73921</v></c><c r="B19" t="s"><v>5</v></c>"#,
                r#"<c r="C19" t="s"><v>6</v></c><c r="D19" t="s"><v>7</v></c></row>"#,
                r#"<row r="20"><c r="A20" t="s"><v>8</v></c><c r="C20"><v>3</v></c>"#,
                r#"<c r="D20"><v>12990.5</v></c></row>"#,
                r#"</sheetData></worksheet>"#
            ),
            MAIN_NS
        );
        let workbook = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{}" "#,
                r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
                r#"<sheets><sheet name="Остатки" sheetId="1" r:id="rId1"/></sheets></workbook>"#
            ),
            MAIN_NS
        );
        let styles = format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="{}">"#,
                r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
                r#"</styleSheet>"#
            ),
            MAIN_NS
        );
        let content_types = concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            r#"</Types>"#
        );
        let package_rels = concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
            r#"</Relationships>"#
        );
        let workbook_rels = concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
            r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            r#"</Relationships>"#
        );

        archive_with(&[
            ("[Content_Types].xml", content_types.as_bytes()),
            ("_rels/.rels", package_rels.as_bytes()),
            ("xl/workbook.xml", workbook.as_bytes()),
            ("xl/_rels/workbook.xml.rels", workbook_rels.as_bytes()),
            ("xl/worksheets/sheet1.xml", sheet.as_bytes()),
            ("xl/sharedStrings.xml", shared_strings.as_bytes()),
            ("xl/styles.xml", styles.as_bytes()),
        ])
    }

    fn feed_archive() -> Vec<u8> {
        let workbook = feed_xlsx();
        archive_with(&[("ostatki.xlsx", &workbook[..])])
    }

    fn expected_remnants() -> Vec<WatchRemnant> {
        vec![
            WatchRemnant::new("73921", ">10", "5'990.00 руб."),
            WatchRemnant::new("A-17", "3", "12990.5"),
        ]
    }

    fn feed_settings(url: String) -> StockFeedSettings {
        StockFeedSettings {
            url,
            file_name: "ostatki.xlsx".to_string(),
            header_row: 17,
            code_column: "Код".to_string(),
            quantity_column: "Количество".to_string(),
            price_column: "Цена".to_string(),
            timeout_secs: 5,
        }
    }

    /// HTTP-сервер на localhost, отвечающий один раз заданным статусом
    async fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}/upload/files/ostatki.zip", addr)
    }

    #[test]
    fn parses_zipped_workbook() {
        let workbook = extract_entry(&feed_archive(), "ostatki.xlsx").unwrap();
        let range = first_worksheet(workbook).unwrap();
        let sheet = read_sheet(&range, 17).unwrap();
        assert_eq!(sheet.header, vec!["Код", "Наименование", "Количество", "Цена"]);

        let remnants = to_remnants(&sheet, &FeedColumns::default()).unwrap();
        assert_eq!(remnants, expected_remnants());
    }

    #[test]
    fn garbage_workbook_is_a_spreadsheet_error() {
        let err = first_worksheet(b"not a workbook".to_vec()).unwrap_err();
        assert!(matches!(err, FeedError::Spreadsheet(_)));
    }

    #[tokio::test]
    async fn download_stock_reads_served_archive() {
        let url = serve_once("200 OK", feed_archive()).await;
        let client = StockFeedClient::new(feed_settings(url)).unwrap();

        let remnants = client.download_stock().await.unwrap();

        assert_eq!(remnants, expected_remnants());
    }

    #[tokio::test]
    async fn download_stock_fails_on_http_error() {
        let url = serve_once("404 Not Found", Vec::new()).await;
        let client = StockFeedClient::new(feed_settings(url)).unwrap();

        let err = client.download_stock().await.unwrap_err();

        assert!(err.to_string().contains("404"), "{:#}", err);
    }

    #[test]
    fn extracts_named_entry() {
        let archive = archive_with(&[("readme.txt", &b"x"[..]), ("ostatki.xls", &b"workbook"[..])]);
        assert_eq!(extract_entry(&archive, "ostatki.xls").unwrap(), b"workbook");
    }

    #[test]
    fn extracts_entry_inside_directory() {
        let archive = archive_with(&[("export/OSTATKI.XLS", &b"workbook"[..])]);
        assert_eq!(extract_entry(&archive, "ostatki.xls").unwrap(), b"workbook");
    }

    #[test]
    fn missing_entry_is_reported() {
        let archive = archive_with(&[("prices.xls", &b"x"[..])]);
        let err = extract_entry(&archive, "ostatki.xls").unwrap_err();
        assert!(matches!(err, FeedError::MissingEntry(name) if name == "ostatki.xls"));
    }

    #[test]
    fn broken_archive_is_a_zip_error() {
        let err = extract_entry(b"not a zip", "ostatki.xls").unwrap_err();
        assert!(matches!(err, FeedError::Zip(_)));
    }

    #[test]
    fn reads_rows_below_header() {
        let sheet = read_sheet(&feed_range(), 3).unwrap();
        assert_eq!(sheet.header, vec!["Код", "Наименование", "Количество", "Цена"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(
            sheet.rows[0],
            hashmap! {
                "Код".to_string() => "73921".to_string(),
                "Наименование".to_string() => "Casio MTP-1302".to_string(),
                "Количество".to_string() => ">10".to_string(),
                "Цена".to_string() => "5'990.00 руб.".to_string(),
            }
        );
        assert_eq!(sheet.rows[1]["Количество"], "3");
        assert_eq!(sheet.rows[1]["Цена"], "12990.5");
    }

    #[test]
    fn header_outside_sheet_is_an_error() {
        assert!(matches!(
            read_sheet(&feed_range(), 0),
            Err(FeedError::MissingHeader(0))
        ));
        assert!(matches!(
            read_sheet(&feed_range(), 40),
            Err(FeedError::MissingHeader(40))
        ));
        // строка 2 существует, но пустая
        assert!(matches!(
            read_sheet(&feed_range(), 2),
            Err(FeedError::MissingHeader(2))
        ));
    }

    #[test]
    fn converts_rows_to_remnants() {
        let sheet = read_sheet(&feed_range(), 3).unwrap();
        let remnants = to_remnants(&sheet, &FeedColumns::default()).unwrap();
        assert_eq!(
            remnants,
            vec![
                WatchRemnant::new("73921", ">10", "5'990.00 руб."),
                WatchRemnant::new("A-17", "3", "12990.5"),
            ]
        );
    }

    #[test]
    fn wrong_header_names_a_missing_column() {
        let sheet = read_sheet(&feed_range(), 3).unwrap();
        let columns = FeedColumns {
            quantity: "Остаток".to_string(),
            ..FeedColumns::default()
        };
        let err = to_remnants(&sheet, &columns).unwrap_err();
        assert!(matches!(err, FeedError::MissingColumn(c) if c == "Остаток"));
    }

    #[test]
    fn cell_text_formats_numbers() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(100.0)), "100");
        assert_eq!(cell_text(&Data::Float(0.5)), "0.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::String("  >10 ".into())), ">10");
    }
}
