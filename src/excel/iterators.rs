// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::excel::{ExcelRow, ExcelSheet};

/// Iterator over every row of an [ExcelSheet], in `(page, index)` order.
///
/// Created by [ExcelSheet::rows], which makes sure every page is resident first.
#[derive(Clone)]
pub struct RowIterator<'a> {
    sheet: &'a ExcelSheet,
    page_index: usize,
    row_index: usize,
}

impl<'a> RowIterator<'a> {
    pub(crate) fn new(sheet: &'a ExcelSheet) -> Self {
        Self {
            sheet,
            page_index: 0,
            row_index: 0,
        }
    }
}

impl<'a> Iterator for RowIterator<'a> {
    type Item = ExcelRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let page = self.sheet.pages.get(self.page_index)?.as_ref()?;

            if self.row_index < page.entry_count() {
                let row_index = self.row_index;
                self.row_index += 1;

                let (row_id, sub_row_count, data) = page.row_data(row_index)?;

                return Some(ExcelRow {
                    row_id,
                    sub_row_count,
                    data,
                });
            }

            // past the last index of this page, step to the next one
            self.page_index += 1;
            self.row_index = 0;
        }
    }
}
