//! 骨架 / 网格 / 权重文本文件解析
//!
//! 三种格式都是逐行文本：
//! - 骨架：`tx ty tz parent`，根关节的 parent 为 -1
//! - 网格：`v x y z` 与 `f i j k`（索引从 1 开始），其他行忽略
//! - 权重：每行 `关节数 - 1` 个浮点数，按顶点顺序
//!
//! 骨架与网格文件中的空行被跳过；权重文件中每一行都是一个顶点，
//! 只有根关节时每行为空。

use std::fs;
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use glam::Vec3;

use crate::mesh::MeshRecord;
use crate::skeleton::SkeletonRecord;
use crate::{Result, SkinError};

/// 从文件加载骨架记录
pub fn read_skeleton<P: AsRef<Path>>(path: P) -> Result<Vec<SkeletonRecord>> {
    let content = fs::read_to_string(path)?;
    parse_skeleton(&content)
}

/// 从文件加载网格记录
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<Vec<MeshRecord>> {
    let content = fs::read_to_string(path)?;
    parse_mesh(&content)
}

/// 从文件加载权重行
pub fn read_attachments<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<f32>>> {
    let content = fs::read_to_string(path)?;
    parse_attachments(&content)
}

/// 解析骨架数据
pub fn parse_skeleton(content: &str) -> Result<Vec<SkeletonRecord>> {
    let mut records = Vec::new();

    for (line_no, mut tokens) in numbered_lines(content) {
        let translation = parse_vec3(&mut tokens, line_no)?;
        let parent = next_value::<i32>(&mut tokens, line_no, "parent index")?;
        if let Some(extra) = tokens.next() {
            return Err(parse_error(line_no, format!("unexpected token '{}'", extra)));
        }
        records.push(SkeletonRecord::new(translation, parent));
    }

    log::debug!("骨架解析完成: {} 条记录", records.len());
    Ok(records)
}

/// 解析网格数据
pub fn parse_mesh(content: &str) -> Result<Vec<MeshRecord>> {
    let mut records = Vec::new();

    for (line_no, mut tokens) in numbered_lines(content) {
        match tokens.next() {
            Some("v") => records.push(MeshRecord::Vertex(parse_vec3(&mut tokens, line_no)?)),
            Some("f") => {
                let i = next_value::<u32>(&mut tokens, line_no, "face index")?;
                let j = next_value::<u32>(&mut tokens, line_no, "face index")?;
                let k = next_value::<u32>(&mut tokens, line_no, "face index")?;
                records.push(MeshRecord::Face([i, j, k]));
            }
            // vn / vt / 注释等
            _ => {}
        }
    }

    log::debug!("网格解析完成: {} 条记录", records.len());
    Ok(records)
}

/// 解析权重数据（列数在加载到网格时校验）
///
/// 空行保留为空行权重，末尾换行不产生额外的行。
pub fn parse_attachments(content: &str) -> Result<Vec<Vec<f32>>> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| {
            line.split_whitespace()
                .map(|token| parse_token::<f32>(token, i + 1, "weight"))
                .collect::<Result<Vec<f32>>>()
        })
        .collect()
}

/// 非空行及其行号（从 1 开始）
fn numbered_lines(content: &str) -> impl Iterator<Item = (usize, SplitWhitespace<'_>)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line.split_whitespace()))
}

fn parse_vec3(tokens: &mut SplitWhitespace<'_>, line_no: usize) -> Result<Vec3> {
    let x = next_value::<f32>(tokens, line_no, "coordinate")?;
    let y = next_value::<f32>(tokens, line_no, "coordinate")?;
    let z = next_value::<f32>(tokens, line_no, "coordinate")?;
    Ok(Vec3::new(x, y, z))
}

fn next_value<T: FromStr>(tokens: &mut SplitWhitespace<'_>, line_no: usize, what: &str) -> Result<T> {
    let token = tokens
        .next()
        .ok_or_else(|| parse_error(line_no, format!("missing {}", what)))?;
    parse_token(token, line_no, what)
}

fn parse_token<T: FromStr>(token: &str, line_no: usize, what: &str) -> Result<T> {
    token
        .parse::<T>()
        .map_err(|_| parse_error(line_no, format!("invalid {} '{}'", what, token)))
}

fn parse_error(line: usize, message: String) -> SkinError {
    SkinError::Parse { line, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skeleton() {
        let records = parse_skeleton("0 0 0 -1\n\n0.5 1.25 -2 0\n").unwrap();
        assert_eq!(
            records,
            vec![
                SkeletonRecord::new(Vec3::ZERO, -1),
                SkeletonRecord::new(Vec3::new(0.5, 1.25, -2.0), 0),
            ]
        );
    }

    #[test]
    fn test_parse_skeleton_errors() {
        assert!(matches!(
            parse_skeleton("0 0 0 -1\n0 1 0\n"),
            Err(SkinError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_skeleton("0 0 0 root\n"),
            Err(SkinError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_skeleton("0 0 0 -1 7\n"),
            Err(SkinError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_mesh() {
        let content = "# comment\nv 0 0 0\nv 1 0 0\nvn 0 0 1\nv 0 1 0\nf 1 2 3\n";
        let records = parse_mesh(content).unwrap();
        assert_eq!(
            records,
            vec![
                MeshRecord::Vertex(Vec3::ZERO),
                MeshRecord::Vertex(Vec3::X),
                MeshRecord::Vertex(Vec3::Y),
                MeshRecord::Face([1, 2, 3]),
            ]
        );
    }

    #[test]
    fn test_parse_mesh_bad_face() {
        assert!(matches!(
            parse_mesh("v 0 0 0\nf 1 2\n"),
            Err(SkinError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_mesh("f -1 2 3\n"),
            Err(SkinError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_attachments() {
        let rows = parse_attachments("1 0 0\n0.25 0.75 0\n").unwrap();
        assert_eq!(rows, vec![vec![1.0, 0.0, 0.0], vec![0.25, 0.75, 0.0]]);

        assert!(matches!(
            parse_attachments("1 0\n0.5 x\n"),
            Err(SkinError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_attachments_keeps_empty_rows() {
        // 只有根关节时每个顶点的权重行为空
        let rows = parse_attachments("\n\n\n").unwrap();
        assert_eq!(rows, vec![Vec::<f32>::new(); 3]);

        let rows = parse_attachments("1\n\n0.5").unwrap();
        assert_eq!(rows, vec![vec![1.0], vec![], vec![0.5]]);
        assert!(parse_attachments("").unwrap().is_empty());
    }

    #[test]
    fn test_read_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 0 0 -1").unwrap();
        writeln!(file, "0 1 0 0").unwrap();

        let records = read_skeleton(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].parent, 0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.skel");

        assert!(matches!(read_skeleton(&missing), Err(SkinError::Io(_))));
        assert!(matches!(read_mesh(&missing), Err(SkinError::Io(_))));
        assert!(matches!(read_attachments(&missing), Err(SkinError::Io(_))));
    }
}
